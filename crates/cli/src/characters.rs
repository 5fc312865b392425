// Account and character commands

use std::path::Path;

use serde::Serialize;

use implant_core::compare::compare;
use implant_core::resolve::Outcome;
use implant_core::search::{search, SearchFields};
use implant_core::{CharacterRecord, RecordPatch};
use implant_io::ocr::extract_record;

use crate::{extractor, print_json, require_file, CliError, Context, OcrEngine, OnDuplicate};

#[derive(Serialize)]
struct Listed<'a> {
    index: usize,
    #[serde(flatten)]
    record: &'a CharacterRecord,
}

pub fn cmd_accounts(ctx: &Context, json: bool) -> Result<(), CliError> {
    let ids = ctx.store.get_all_account_ids();
    if json {
        return print_json(&ids);
    }
    for id in ids {
        let count = ctx.store.records(id).map(<[_]>::len).unwrap_or(0);
        println!("{id}\t{count}");
    }
    Ok(())
}

pub fn cmd_add_account(ctx: &mut Context, id: &str) -> Result<(), CliError> {
    ctx.store.add_account(id)?;
    println!("Added account {}", id.trim());
    Ok(())
}

pub fn cmd_add(
    ctx: &mut Context,
    account: &str,
    image: &Path,
    on_duplicate: Option<OnDuplicate>,
    ocr: OcrEngine,
) -> Result<(), CliError> {
    require_file(image)?;
    let reader = extractor(ocr, &ctx.settings)?;
    let candidate = extract_record(reader.as_ref(), image);
    let sample = candidate
        .identity()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let outcome = ctx.store.insert_candidate(
        account,
        candidate,
        Some(image),
        ctx.settings.allow_clones,
        on_duplicate.map(Into::into),
    )?;

    match outcome {
        Outcome::Appended { index } => println!("Added sample #{sample} at index {index}"),
        Outcome::Replaced { index } => println!("Replaced sample #{sample} at index {index}"),
        Outcome::Cloned { index, clone_index } => {
            println!("Added clone #{clone_index} of sample #{sample} at index {index}")
        }
    }
    Ok(())
}

pub fn cmd_list(
    ctx: &Context,
    account: &str,
    query: Option<&str>,
    fields: &str,
    json: bool,
) -> Result<(), CliError> {
    let fields = SearchFields::parse(fields).map_err(CliError::usage)?;
    let records = ctx.store.records(account)?;
    let hits = search(records, query.unwrap_or(""), fields);

    if json {
        let listed: Vec<Listed> = hits
            .into_iter()
            .map(|(index, record)| Listed { index, record })
            .collect();
        return print_json(&listed);
    }

    if hits.is_empty() {
        eprintln!("no characters");
    }
    for (index, record) in hits {
        println!("{}", record.summary_line(index));
    }
    Ok(())
}

fn or_na(v: Option<&str>) -> &str {
    v.unwrap_or("N/A")
}

pub fn cmd_show(ctx: &Context, account: &str, index: usize, json: bool) -> Result<(), CliError> {
    let r = ctx.store.get_character(account, index)?;
    if json {
        return print_json(&Listed { index, record: r });
    }

    println!("Sample Number:  {}", or_na(r.sample_number.as_ref().map(|s| s.as_str())));
    println!("Vernacular ID:  {}", or_na(r.vernacular_id.as_deref()));
    println!("Gender:         {}", or_na(r.gender.as_deref()));
    println!("Chibi Levels:   {}", r.chibi_levels);
    println!("Boss Kills:");
    for line in &r.survival_quotient {
        println!("  - {line}");
    }
    println!("Explorer Notes:");
    for line in &r.explorer_notes {
        println!("  - {line}");
    }
    println!("Comments:       {}", r.comments);
    println!("Image:          {}", or_na(r.background_image.as_deref()));
    println!("Date Added:     {}", r.date_added);
    if r.is_clone() {
        println!("Clone:          #{}", r.clone_index.unwrap_or(0));
    }
    Ok(())
}

pub fn cmd_comment(ctx: &mut Context, account: &str, index: usize, text: String) -> Result<(), CliError> {
    ctx.store.update_character(account, index, RecordPatch::comments(text))?;
    println!("Updated comments for index {index}");
    Ok(())
}

pub fn cmd_background(ctx: &mut Context, account: &str, index: usize, image: &Path) -> Result<(), CliError> {
    require_file(image)?;
    let r = ctx.store.change_background(account, index, image)?;
    println!("Background for index {index}: {}", or_na(r.background_image.as_deref()));
    Ok(())
}

pub fn cmd_clone(ctx: &mut Context, account: &str, index: usize) -> Result<(), CliError> {
    let new_index = ctx.store.clone_character(account, index)?;
    let clone = ctx.store.get_character(account, new_index)?;
    println!(
        "Created clone #{} of index {index} at index {new_index}",
        clone.clone_index.unwrap_or(0)
    );
    Ok(())
}

pub fn cmd_delete(ctx: &mut Context, account: &str, indices: &[usize]) -> Result<(), CliError> {
    let removed = ctx.store.delete_characters(account, indices)?;
    println!("Deleted {} character(s)", removed.len());
    Ok(())
}

pub fn cmd_compare(ctx: &Context, account: &str, indices: &[usize], json: bool) -> Result<(), CliError> {
    let records = indices
        .iter()
        .map(|&i| ctx.store.get_character(account, i))
        .collect::<Result<Vec<_>, _>>()?;
    let rows = compare(&records).ok_or_else(|| CliError::usage("compare needs at least two characters"))?;

    if json {
        let table: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| serde_json::json!({ "field": row.field, "values": row.values }))
            .collect();
        return print_json(&table);
    }

    let header: Vec<String> = indices.iter().map(|i| format!("#{i}")).collect();
    println!("{:<15} {}", "", header.join(" | "));
    for row in rows {
        let cells: Vec<String> = row.values.iter().map(|v| v.replace('\n', "; ")).collect();
        println!("{:<15} {}", row.field, cells.join(" | "));
    }
    Ok(())
}

pub fn cmd_scan(ctx: &mut Context, ocr: OcrEngine, json: bool) -> Result<(), CliError> {
    let reader = extractor(ocr, &ctx.settings)?;
    let report = ctx.store.scan_directory(reader.as_ref())?;

    if json {
        return print_json(&serde_json::json!({
            "added": report.added,
            "skipped": report.skipped,
            "errors": report.errors,
        }));
    }
    println!("Imported {} new character(s), skipped {}", report.added, report.skipped);
    for err in &report.errors {
        eprintln!("warning: {err}");
    }
    Ok(())
}
