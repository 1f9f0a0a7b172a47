use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use models::{NewBugReport, NewExhibit, NewPart, UpdateExhibit, UpdatePart};
use services::{
    Inventory,
    services::{
        filters::{
            DerivedView, JotformField, PartField, compare_names, sort_by_name,
            sort_jotforms, sort_notes,
        },
        notification::TracingNotifier,
        shell::LocalShell,
    },
};
use tracing::debug;
use utils::{config::Config, logging::init_tracing};

mod cli;
mod render;

use cli::{Cli, Commands, DevCommand, ExhibitCommand, JotformCommand, NoteCommand, PartCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(Some(if cli.verbose { "debug" } else { "warn" }));

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.base_url = url.to_string();
    }
    debug!(base_url = %config.base_url, "Using backend");

    if let Commands::Config = cli.command {
        print_config(&config);
        return Ok(());
    }

    let shell = Arc::new(LocalShell::from_config(&config));
    let inventory = Inventory::from_config(&config, shell, Arc::new(TracingNotifier))?;

    match cli.command {
        Commands::Exhibits(command) => exhibits(&inventory, command).await,
        Commands::Parts(command) => parts(&inventory, command).await,
        Commands::Notes(command) => notes(&inventory, command).await,
        Commands::Jotforms(command) => jotforms(&inventory, command).await,
        Commands::ReportBug { title, description } => {
            inventory
                .report_bug(NewBugReport { title, description })
                .await?;
            println!("Bug report sent");
            Ok(())
        }
        Commands::Whoami => {
            match inventory.profile().await {
                Ok(profile) => render::profile(&profile),
                Err(_) => println!("Not signed in"),
            }
            Ok(())
        }
        Commands::Dev(DevCommand::Seed) => {
            inventory.seed_dummy_data().await?;
            println!("Dummy data created");
            Ok(())
        }
        Commands::Dev(DevCommand::Reset) => {
            inventory.reset_backend().await?;
            println!("All data cleared");
            Ok(())
        }
        Commands::Config => Ok(()),
    }
}

fn print_config(config: &Config) {
    println!("environment      = {}", config.environment);
    println!("api_url          = {}", config.base_url);
    println!("request_timeout  = {:?}", config.request_timeout);
    println!("search_debounce  = {:?}", config.search_debounce);
    println!("refetch_interval = {:?}", config.cache.refetch_interval());
    println!("stale_time       = {:?}", config.cache.stale_time());
    println!("retry            = {}", config.cache.retry);
    match &config.profile {
        Some(profile) => println!("profile          = {}", profile.name),
        None => println!("profile          = (none)"),
    }
}

async fn exhibits(inventory: &Inventory, command: ExhibitCommand) -> anyhow::Result<()> {
    match command {
        ExhibitCommand::List(filters) => {
            let records = inventory.exhibits().await?;
            let mut view = DerivedView::new(records.to_vec()).with_sort(sort_by_name);
            if let Some(term) = filters.search.clone() {
                view.set_search(term);
            }
            for (field, value) in filters.selections() {
                view.set_filter(field, value);
            }
            let summary = view.summary();
            render::exhibit_rows(view.rows(), summary);
        }
        ExhibitCommand::Show { id } => {
            let exhibit = inventory.exhibit(&id).await?;
            let mut parts = inventory.exhibit_parts(&exhibit).await?.to_vec();
            sort_by_name(&mut parts);
            let mut notes = exhibit.notes.clone();
            sort_notes(&mut notes);
            render::exhibit_detail(&exhibit, &parts, &notes);
        }
        ExhibitCommand::Options { field } => {
            let records = inventory.exhibits().await?;
            let mut values = DerivedView::new(records.to_vec()).options(field);
            values.sort();
            for value in values {
                println!("{value}");
            }
        }
        ExhibitCommand::Random => {
            let exhibit = inventory.random_exhibit().await?;
            println!("{} ({})", exhibit.name, exhibit.id);
            if let Some(url) = &exhibit.image_url {
                println!("{url}");
            }
        }
        ExhibitCommand::Create {
            name,
            cluster,
            location,
            status,
            image_url,
        } => {
            let mut exhibit = NewExhibit::new(name, cluster, location);
            if let Some(status) = status {
                exhibit.status = status;
            }
            exhibit.image_url = image_url;
            let id = inventory.create_exhibit(exhibit).await?;
            println!("{id}");
        }
        ExhibitCommand::Edit {
            id,
            name,
            cluster,
            location,
            description,
            image_url,
        } => {
            let changes = UpdateExhibit {
                name,
                cluster,
                location,
                description,
                image_url,
            };
            if changes.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            inventory.edit_exhibit(&id, changes).await?;
            println!("Exhibit updated");
        }
        ExhibitCommand::Delete { id } => {
            inventory.delete_exhibit(&id).await?;
            println!("Exhibit deleted");
        }
        ExhibitCommand::Status { id, status } => {
            inventory.change_exhibit_status(&id, status).await?;
            println!("Status updated");
        }
        ExhibitCommand::AddPart { id, part_id } => {
            inventory.add_part_to_exhibit(&id, &part_id).await?;
            println!("Part added to exhibit");
        }
    }
    Ok(())
}

async fn parts(inventory: &Inventory, command: PartCommand) -> anyhow::Result<()> {
    match command {
        PartCommand::List { search, exhibit } => {
            let records = inventory.parts().await?;
            let mut view = DerivedView::new(records.to_vec()).with_sort(sort_by_name);
            if let Some(term) = search {
                view.set_search(term);
            }
            view.set_filter(PartField::Exhibit, exhibit);
            let summary = view.summary();
            render::part_rows(view.rows(), summary);
        }
        PartCommand::Show { id } => {
            let part = inventory.part(&id).await?;
            let exhibits = inventory.exhibits().await?;
            let mut owners: Vec<_> = exhibits
                .iter()
                .filter(|e| part.exhibit_ids.contains(&e.id))
                .collect();
            owners.sort_by(|a, b| compare_names(&a.name, &b.name));
            let mut part = (*part).clone();
            sort_notes(&mut part.notes);
            render::part_detail(&part, &owners);
        }
        PartCommand::Create {
            name,
            link,
            exhibits,
        } => {
            let id = inventory
                .create_part(NewPart::new(name, link).for_exhibits(exhibits))
                .await?;
            println!("{id}");
        }
        PartCommand::Edit {
            id,
            name,
            link,
            exhibits,
        } => {
            let current = inventory.part(&id).await?;
            let mut update = UpdatePart::from(&*current);
            if let Some(name) = name {
                update.name = name;
            }
            if let Some(link) = link {
                update.link = link;
            }
            if let Some(exhibits) = exhibits {
                update.exhibit_ids = exhibits;
            }
            inventory.edit_part(&id, update).await?;
            println!("Part updated");
        }
        PartCommand::Delete { id } => {
            inventory.delete_part(&id).await?;
            println!("Part deleted");
        }
    }
    Ok(())
}

async fn notes(inventory: &Inventory, command: NoteCommand) -> anyhow::Result<()> {
    match command {
        NoteCommand::List { owner } => {
            let owner = owner.owner().context("pass --exhibit or --part")?;
            let mut notes = inventory.client().notes(owner).list().await?;
            sort_notes(&mut notes);
            render::note_rows(&notes);
        }
        NoteCommand::Add {
            owner,
            message,
            submitter,
        } => {
            let owner = owner.owner().context("pass --exhibit or --part")?;
            inventory.create_note(&owner, &message, submitter).await?;
            println!("Note added");
        }
        NoteCommand::Delete { owner, note_id } => {
            let owner = owner.owner().context("pass --exhibit or --part")?;
            inventory.delete_note(&owner, &note_id).await?;
            println!("Note deleted");
        }
    }
    Ok(())
}

async fn jotforms(inventory: &Inventory, command: JotformCommand) -> anyhow::Result<()> {
    match command {
        JotformCommand::List {
            search,
            department,
            status,
        } => {
            let records = inventory.jotforms().await?;
            let mut view = DerivedView::new(records.to_vec()).with_sort(sort_jotforms);
            if let Some(term) = search {
                view.set_search(term);
            }
            view.set_filter(
                JotformField::Department,
                department.map(|d| JotformField::Department.canonical_value(&d)),
            );
            view.set_filter(
                JotformField::Status,
                status.map(|s| JotformField::Status.canonical_value(&s)),
            );
            let summary = view.summary();
            render::jotform_rows(view.rows(), summary);
        }
        JotformCommand::Status { id, status } => {
            let forms = inventory.jotforms().await?;
            let form = forms
                .iter()
                .find(|f| f.id == id)
                .with_context(|| format!("Jotform with ID {id} not found"))?;
            if inventory.change_jotform_status(form, status).await? {
                println!("Status updated");
            } else {
                println!("Status unchanged");
            }
        }
        JotformCommand::Delete { id } => {
            inventory.delete_jotform(&id).await?;
            println!("Form deleted");
        }
    }
    Ok(())
}
