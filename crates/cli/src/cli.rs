use clap::{Args, Parser, Subcommand};
use models::{ExhibitStatus, JotformStatus, NoteOwner};
use services::services::filters::ExhibitField;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "inventory", version, about = "Museum exhibit and parts inventory")]
pub struct Cli {
    /// Backend base URL; overrides the configured environment.
    #[arg(long, global = true, env = "INVENTORY_API_URL")]
    pub api_url: Option<Url>,

    /// Log requests and cache activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Browse and edit exhibits.
    #[command(subcommand)]
    Exhibits(ExhibitCommand),

    /// Browse and edit parts.
    #[command(subcommand)]
    Parts(PartCommand),

    /// Notes on exhibits and parts.
    #[command(subcommand)]
    Notes(NoteCommand),

    /// Triage submitted jotforms.
    #[command(subcommand)]
    Jotforms(JotformCommand),

    /// Send a bug report signed with your first name.
    ReportBug {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },

    /// Show the signed-in user.
    Whoami,

    /// Print the resolved configuration.
    Config,

    /// Development helpers for the backend.
    #[command(subcommand)]
    Dev(DevCommand),
}

#[derive(Debug, Args)]
pub struct ExhibitFilters {
    /// Case-insensitive match on the name.
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(long)]
    pub cluster: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

impl ExhibitFilters {
    /// Dropdown selections with typed values spelled the way records store them.
    pub fn selections(&self) -> Vec<(ExhibitField, Option<String>)> {
        [
            (ExhibitField::Cluster, &self.cluster),
            (ExhibitField::Location, &self.location),
            (ExhibitField::Status, &self.status),
        ]
        .into_iter()
        .map(|(field, value)| (field, value.as_deref().map(|v| field.canonical_value(v))))
        .collect()
    }
}

#[derive(Debug, Subcommand)]
pub enum ExhibitCommand {
    /// List exhibits sorted by name.
    List(ExhibitFilters),

    /// One exhibit with its parts and notes.
    Show { id: String },

    /// Distinct values for a filter dropdown (cluster, location or status).
    Options { field: ExhibitField },

    /// The exhibit featured on the sign-in screen.
    Random,

    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        status: Option<ExhibitStatus>,
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Change only the fields given.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },

    Delete { id: String },

    Status { id: String, status: ExhibitStatus },

    AddPart { id: String, part_id: String },
}

#[derive(Debug, Subcommand)]
pub enum PartCommand {
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Only parts used by this exhibit.
        #[arg(long)]
        exhibit: Option<String>,
    },

    Show { id: String },

    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
        /// Exhibit ids to attach the part to; repeatable.
        #[arg(long = "exhibit")]
        exhibits: Vec<String>,
    },

    /// Replace the given fields. `--exhibit` replaces the whole membership list.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long = "exhibit")]
        exhibits: Option<Vec<String>>,
    },

    Delete { id: String },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct OwnerArgs {
    /// Exhibit the note belongs to.
    #[arg(long)]
    pub exhibit: Option<String>,
    /// Part the note belongs to.
    #[arg(long)]
    pub part: Option<String>,
}

impl OwnerArgs {
    pub fn owner(&self) -> Option<NoteOwner> {
        match (&self.exhibit, &self.part) {
            (Some(id), _) => Some(NoteOwner::exhibit(id)),
            (None, Some(id)) => Some(NoteOwner::part(id)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Newest first.
    List {
        #[command(flatten)]
        owner: OwnerArgs,
    },

    Add {
        #[command(flatten)]
        owner: OwnerArgs,
        message: String,
        /// Defaults to the signed-in user's name.
        #[arg(long)]
        submitter: Option<String>,
    },

    Delete {
        #[command(flatten)]
        owner: OwnerArgs,
        note_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum JotformCommand {
    /// List forms grouped by status, newest first within each group.
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },

    Status { id: String, status: JotformStatus },

    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum DevCommand {
    /// Fill the backend with sample exhibits, parts and forms.
    Seed,
    /// Delete everything on the backend.
    Reset,
}
