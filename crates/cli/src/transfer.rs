// CSV, backup and storage commands

use std::path::Path;

use implant_config::Settings;
use implant_io::csv::{self as codec, ExportLayout};
use implant_io::Store;

use crate::exit_codes::{EXIT_IMPORT_ABORTED, EXIT_IMPORT_ROWS};
use crate::{print_json, require_file, CliError, Context};

pub fn cmd_export(ctx: &Context, file: &Path, extended: bool) -> Result<(), CliError> {
    let layout = if extended { ExportLayout::Extended } else { ExportLayout::Standard };
    let rows = codec::export(ctx.store.accounts(), file, layout)?;
    println!("Exported {rows} character(s) to {}", file.display());
    Ok(())
}

pub fn cmd_export_each(ctx: &Context, account: &str, out_dir: &Path, indices: &[usize]) -> Result<(), CliError> {
    // Fail on bad indices up front instead of silently skipping them
    for &index in indices {
        ctx.store.get_character(account, index)?;
    }
    let selection: Vec<(&str, usize)> = indices.iter().map(|&i| (account, i)).collect();
    let written = codec::export_each(ctx.store.accounts(), &selection, out_dir)?;
    println!("Wrote {written} file(s) to {}", out_dir.display());
    if written < selection.len() {
        return Err(CliError::io(format!(
            "{} file(s) could not be written",
            selection.len() - written
        )));
    }
    Ok(())
}

pub fn cmd_import(ctx: &mut Context, file: &Path, overwrite: bool) -> Result<(), CliError> {
    let report = codec::import(&mut ctx.store, file, overwrite)?;

    println!("Imported {} character(s), {} failed", report.succeeded, report.failed);
    for line in &report.diagnostics {
        eprintln!("  {line}");
    }

    if report.aborted {
        let message = report.diagnostics.first().cloned().unwrap_or_default();
        return Err(CliError {
            code: EXIT_IMPORT_ABORTED,
            message: format!("import aborted: {message}"),
            hint: Some("create a valid file with `implant template <file>`".to_string()),
        });
    }
    if report.failed > 0 {
        return Err(CliError {
            code: EXIT_IMPORT_ROWS,
            message: format!("{} row(s) failed", report.failed),
            hint: None,
        });
    }
    Ok(())
}

pub fn cmd_template(file: &Path) -> Result<(), CliError> {
    codec::write_template(file)?;
    println!("Template written to {}", file.display());
    Ok(())
}

pub fn cmd_backup(ctx: &Context, dir: &Path, images: bool) -> Result<(), CliError> {
    let report = ctx.store.backup(dir, images)?;
    println!("Backup written to {}", report.file.display());
    println!("Characters: {}", report.characters);
    match &report.image_dir {
        Some(image_dir) => println!("Images: {} copied to {}", report.copied_images, image_dir.display()),
        None => println!("Images: not included"),
    }
    Ok(())
}

pub fn cmd_restore(ctx: &mut Context, file: &Path) -> Result<(), CliError> {
    require_file(file)?;
    let count = ctx
        .store
        .restore(file)
        .map_err(|e| CliError::from(e).with_hint("the current data was left unchanged"))?;
    println!("Restored {count} character(s)");
    Ok(())
}

pub fn cmd_reset(settings: &Settings, yes: bool) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::usage("reset deletes every stored character")
            .with_hint("rerun with --yes, after `implant backup <dir>` if the data matters"));
    }
    let store = Store::open_reset(settings.base_directory(), Some(settings.effective_data_file()))?;
    println!("Character data reset: {}", store.data_file().display());
    Ok(())
}

pub fn cmd_location(ctx: &Context, json: bool) -> Result<(), CliError> {
    let info = ctx.store.storage_info();
    if json {
        return print_json(&info);
    }

    println!("Base directory: {}", info.base_directory.display());
    println!("Data file:      {}", info.data_file.display());
    println!("Base directory exists: {}", info.base_dir_exists);
    println!("Data file exists:      {}", info.data_file_exists);
    if !info.directory_contents.is_empty() {
        println!("Files in base directory ({}):", info.directory_contents.len());
        for name in info.directory_contents.iter().take(20) {
            println!("  - {name}");
        }
        if info.directory_contents.len() > 20 {
            println!("  ... and {} more", info.directory_contents.len() - 20);
        }
    }
    for account in &info.accounts {
        println!(
            "{}: {} character(s), {} image(s)",
            account.account, account.characters, account.images
        );
    }
    Ok(())
}
