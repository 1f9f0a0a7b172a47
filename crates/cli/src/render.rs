//! Plain-text tables for terminal output.

use models::{Exhibit, Jotform, Note, Part, UserProfile};
use services::services::filters::ViewSummary;

pub fn exhibit_rows(exhibits: &[Exhibit], summary: ViewSummary) {
    println!(
        "{:<24} {:<14} {:<12} {:<16} ID",
        "NAME", "CLUSTER", "LOCATION", "STATUS"
    );
    for exhibit in exhibits {
        println!(
            "{:<24} {:<14} {:<12} {:<16} {}",
            exhibit.name,
            exhibit.cluster,
            exhibit.location,
            exhibit.status.as_str(),
            exhibit.id
        );
    }
    println!("{summary}");
}

pub fn exhibit_detail(exhibit: &Exhibit, parts: &[Part], notes: &[Note]) {
    println!("{} ({})", exhibit.name, exhibit.id);
    println!("  Cluster:  {}", exhibit.cluster);
    println!("  Location: {}", exhibit.location);
    println!("  Status:   {}", exhibit.status);
    if let Some(url) = &exhibit.image_url {
        println!("  Image:    {url}");
    }
    if let Some(sponsor) = &exhibit.sponsorship {
        println!(
            "  Sponsor:  {} ({} to {})",
            sponsor.sponsor_name, sponsor.start_date, sponsor.end_date
        );
    }
    println!("Parts:");
    if parts.is_empty() {
        println!("  none");
    }
    for part in parts {
        println!("  {:<24} {} ({})", part.name, part.link, part.id);
    }
    note_rows(notes);
}

pub fn part_rows(parts: &[Part], summary: ViewSummary) {
    println!("{:<24} {:<40} {:<12} ID", "NAME", "LINK", "EXHIBITS");
    for part in parts {
        println!(
            "{:<24} {:<40} {:<12} {}",
            part.name,
            part.link,
            part.exhibit_ids.len(),
            part.id
        );
    }
    println!("{summary}");
}

pub fn part_detail(part: &Part, exhibits: &[&Exhibit]) {
    println!("{} ({})", part.name, part.id);
    println!("  Link: {}", part.link);
    println!("Exhibits:");
    if exhibits.is_empty() {
        println!("  none");
    }
    for exhibit in exhibits {
        println!("  {} ({})", exhibit.name, exhibit.id);
    }
    note_rows(&part.notes);
}

pub fn note_rows(notes: &[Note]) {
    println!("Notes:");
    if notes.is_empty() {
        println!("  none");
    }
    for note in notes {
        println!(
            "  [{} {}] {}: {} ({})",
            note.timestamp.date, note.timestamp.time, note.submitter, note.message, note.id
        );
    }
}

pub fn jotform_rows(forms: &[Jotform], summary: ViewSummary) {
    println!(
        "{:<11} {:<10} {:<8} {:<20} {:<16} {:<6} {:<11} ID",
        "STATUS", "DATE", "TIME", "SUBMITTER", "EXHIBIT", "PRIO", "DEPARTMENT"
    );
    for form in forms {
        let time = form.created_at.time_12h().unwrap_or_default();
        println!(
            "{:<11} {:<10} {:<8} {:<20} {:<16} {:<6} {:<11} {}",
            form.status.as_str(),
            form.created_at.date,
            time,
            form.submitter_name.full(),
            form.exhibit_name,
            form.priority_level.as_str(),
            form.department.as_str(),
            form.id
        );
    }
    println!("{summary}");
}

pub fn profile(profile: &UserProfile) {
    println!("{} ({})", profile.display_name(), profile.id);
    if let Some(picture) = &profile.picture {
        println!("  Picture: {picture}");
    }
}
