use crate::drive::model::FileDescriptor;
use crate::drive::utils::OutputFormat;
use crate::drive::utils::fields::split_fields;
use crate::drive::utils::size::format_size_field;
use crate::drive::{
    CreateOptions, DriveClient, FileResource, GetOptions, ListQuery, TrashMode,
};
use crate::error::Result;
use crate::utils::confirm_deletion;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gdrive-model", version, about = "Create, inspect, search and trash Google Drive files")]
pub struct Args {
    /// Output format
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Human,
        env = "GDRIVE_OUTPUT_FORMAT",
        global = true
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a file or folder
    Create(CreateArgs),

    /// Show metadata of a file
    Get {
        /// Id of the file
        file_id: String,

        /// Comma separated response fields, e.g. id,name,parents
        #[arg(long)]
        fields: Option<String>,
    },

    /// List or search files
    Ls {
        /// Drive search expression, e.g. "name contains 'report'"
        #[arg(short, long)]
        query: Option<String>,

        /// Spaces to search, e.g. drive or appDataFolder
        #[arg(long)]
        spaces: Option<String>,

        /// Comma separated response fields, e.g. files(id,name),nextPageToken
        #[arg(long)]
        fields: Option<String>,

        /// Follow page tokens and print every match
        #[arg(long)]
        all: bool,
    },

    /// Move files to the trash, or delete them with --permanent
    Rm {
        /// Ids of the files, processed in the given order
        #[arg(required = true)]
        file_ids: Vec<String>,

        /// Delete immediately instead of trashing
        #[arg(long)]
        permanent: bool,

        /// Skip the confirmation prompt for permanent deletion
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments of the `create` command.
///
/// `--local-file` and `--body` are not declared as conflicting so that the client's own
/// validation reports the conflict.
#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Create a folder instead of a file
    #[arg(long)]
    pub folder: bool,

    /// Local file to upload
    #[arg(long)]
    pub local_file: Option<PathBuf>,

    /// Inline content to upload
    #[arg(long)]
    pub body: Option<String>,

    /// Name of the new file; defaults to the local file name
    #[arg(long)]
    pub name: Option<String>,

    /// MIME type of the content; ignored for folders
    #[arg(long)]
    pub mime_type: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Parent folder id, may be repeated
    #[arg(long = "parent")]
    pub parents: Vec<String>,

    /// Comma separated response fields
    #[arg(long)]
    pub fields: Option<String>,
}

impl CreateArgs {
    fn into_options(self) -> CreateOptions {
        CreateOptions {
            is_folder: self.folder,
            local_file: self.local_file,
            media_body: self.body.map(String::into_bytes),
            resource: FileResource {
                name: self.name,
                description: self.description,
                mime_type: self.mime_type,
                parents: self
                    .parents
                    .into_iter()
                    .map(FileDescriptor::with_id)
                    .collect(),
            },
            ret_fields: fields_arg(self.fields.as_deref()),
        }
    }
}

fn fields_arg(raw: Option<&str>) -> Vec<String> {
    raw.map(split_fields).unwrap_or_default()
}

/// One line of human readable output.
struct FileLine<'a>(&'a FileDescriptor);

impl fmt::Display for FileLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.0;
        let file_type = if file.is_folder() { "DIR" } else { "FILE" };
        let size = if file.is_folder() {
            "-".to_string()
        } else {
            format_size_field(file.size.as_deref())
        };
        let trashed = if file.trashed == Some(true) {
            " (trashed)"
        } else {
            ""
        };
        write!(
            f,
            "{file_type:<6} {size:>10} {}\t{}{trashed}",
            file.id.as_deref().unwrap_or("-"),
            file.name.as_deref().unwrap_or("")
        )
    }
}

fn print_file(file: &FileDescriptor, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => println!("{}", FileLine(file)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(file)?),
    }
    Ok(())
}

fn print_files(files: &[FileDescriptor], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for file in files {
                println!("{}", FileLine(file));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(files)?),
    }
    Ok(())
}

pub async fn run(args: Args, client: DriveClient) -> Result<()> {
    let format = args.format;
    match args.command {
        Commands::Create(create) => {
            let file = client.create_file(create.into_options()).await?;
            print_file(&file, format)
        }
        Commands::Get { file_id, fields } => {
            let options = GetOptions {
                file_id,
                ret_fields: fields_arg(fields.as_deref()),
            };
            let file = client.get_file(&options).await?;
            print_file(&file, format)
        }
        Commands::Ls {
            query,
            spaces,
            fields,
            all,
        } => {
            let query = ListQuery {
                query,
                spaces,
                ret_fields: fields_arg(fields.as_deref()),
                page_token: None,
            };
            let files = if all {
                client.list_all_files(&query).await?
            } else {
                client.list_files(&query).await?
            };
            print_files(&files, format)
        }
        Commands::Rm {
            file_ids,
            permanent,
            force,
        } => {
            let mode = TrashMode::from_permanent(permanent);
            if mode == TrashMode::Delete && !confirm_deletion(&file_ids, force)? {
                println!("Aborted");
                return Ok(());
            }

            let results = client.trash_files(&file_ids, mode).await?;
            match format {
                OutputFormat::Human => {
                    let verb = match mode {
                        TrashMode::Trash => "Trashed",
                        TrashMode::Delete => "Deleted",
                    };
                    for file_id in &file_ids {
                        println!("{verb}: {file_id}");
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            }
            Ok(())
        }
    }
}
