use anyhow::{Context, Result, anyhow};
use layout_cli::pipeline::{ResolveInputs, derive_groups, resolve_form};
use layout_cli::render::{groups_table, page_table, render_tree};
use layout_engine::BuildOptions;

use crate::cli::{OutputFormatArg, ResolveArgs, SourceArgs};

pub fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let inputs = ResolveInputs {
        layouts: args.source.layouts.clone(),
        data: args.source.data.clone(),
        page: args.page.clone(),
        instance: args.instance.clone(),
        settings: args.settings.clone(),
        texts: args.texts.clone(),
        hidden: args.hidden.clone(),
        options: BuildOptions::default()
            .strict(args.strict)
            .with_text_resource_rewrite(!args.no_text_rewrite)
            .with_mapping_rewrite(!args.no_mapping_rewrite),
    };
    let outcome = resolve_form(&inputs)?;
    let page = outcome
        .pages
        .current()
        .ok_or_else(|| anyhow!("no page to show"))?;

    match args.format {
        OutputFormatArg::Tree => {
            println!("Page: {}", page.name());
            print!("{}", render_tree(page));
        }
        OutputFormatArg::Table => {
            println!("Page: {}", page.name());
            println!("{}", page_table(page));
        }
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&page.to_json()).context("serialize page")?;
            println!("{json}");
        }
    }
    for warning in page.warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

pub fn run_groups(args: &SourceArgs) -> Result<()> {
    let groups = derive_groups(&args.layouts, &args.data)?;
    if groups.is_empty() {
        println!("No repeating groups.");
        return Ok(());
    }
    println!("{}", groups_table(&groups));
    Ok(())
}
