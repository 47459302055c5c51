use std::{env, process};
use std::io::{self, Write};
use anyhow::Context;
use log::{error, info};
use crate::initialization::init;
use crate::render::render_page;

mod charts;
mod config;
mod errors;
mod initialization;
mod manager_data;
mod manager_model;
mod maps;
mod models;
mod prediction;
mod render;
mod shell;

fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).unwrap_or("config.toml".to_string());

    let (mut dashboard, interaction) = init(&config_path)?;
    if !interaction.sidebar.any() {
        info!("No sections toggled, rendering placeholder only");
    }

    let page = match dashboard.interact(&interaction) {
        Ok(page) => page,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    let html = render_page(&page)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_bytes()).context("failed to write page to stdout")?;
    stdout.flush()?;

    let (data_reads, map_reads) = dashboard.reads();
    info!("Rendered {} sections, table reads: data {}, map {}", page.sections.len(), data_reads, map_reads);

    Ok(())
}
