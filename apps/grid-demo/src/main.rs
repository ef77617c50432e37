//! Pages a synthetic contact list into two grids and prints what a host
//! would display after scrolling each one to the end.
//!
//! ```text
//! GRID_DEMO_PAGES=5 GRID_DEMO_PAGE_SIZE=10 RUST_LOG=debug cargo run -p grid-demo
//! ```

mod host;

use anyhow::Context;
use futures::future;
use scrollgrid::{
    record, DeclaredChild, Element, FetchError, GridConfig, GridTemplates, Record, RenderNode,
    RenderResult,
};
use serde_json::json;

use crate::host::Host;

const DEFAULT_PAGES: usize = 4;
const DEFAULT_PAGE_SIZE: usize = 8;
const MAX_PAGES: usize = 1_000;
const MAX_PAGE_SIZE: usize = 10_000;

const FIRST_NAMES: [&str; 6] = ["Ada", "Grace", "Alan", "Edsger", "Barbara", "Ken"];
const CITIES: [&str; 4] = ["London", "Arlington", "Austin", "Zurich"];

#[derive(Clone, Debug)]
struct Contact {
    name: String,
    city: String,
}

fn contact(i: usize) -> Contact {
    Contact {
        name: format!("{} #{i}", FIRST_NAMES[i % FIRST_NAMES.len()]),
        city: CITIES[i % CITIES.len()].to_string(),
    }
}

fn env_knob(name: &str, default: usize, max: usize) -> anyhow::Result<usize> {
    match std::env::var(name) {
        Ok(value) => parse_knob(name, &value, max),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {name}")),
    }
}

fn parse_knob(name: &str, value: &str, max: usize) -> anyhow::Result<usize> {
    let parsed: usize = value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a non-negative integer, got {value:?}"))?;
    anyhow::ensure!(parsed <= max, "{name} must be at most {max}, got {parsed}");
    Ok(parsed)
}

/// Serves `pages` full pages, then empty ones.
fn page_of<T>(
    pages: usize,
    make: impl Fn(usize) -> T,
    page: usize,
    page_size: usize,
) -> future::Ready<Result<Vec<T>, FetchError>> {
    if page >= pages {
        return future::ready(Ok(Vec::new()));
    }
    let range = page
        .checked_mul(page_size)
        .and_then(|start| Some(start..start.checked_add(page_size)?));
    future::ready(match range {
        Some(range) => Ok(range.map(make).collect()),
        None => Err(FetchError::new(format!(
            "page {page} of {page_size} items is out of range"
        ))),
    })
}

fn declared_grid(pages: usize, config: GridConfig) -> anyhow::Result<()> {
    let children = [
        DeclaredChild::other("style", "td { padding: 4px; }"),
        DeclaredChild::header("<tr><th>#</th><th>Name</th><th>City</th></tr>"),
        DeclaredChild::row(
            "<tr><td>${index}</td><td>${item.name}</td><td>${item.address.city}</td></tr>",
        ),
    ];
    let templates = GridTemplates::from_declared(&children);

    let mut host: Host<Record> = Host::new(config, templates, 300.0, 30.0)?;
    host.grid().set_fetch_source(move |page: usize, page_size: usize| {
        page_of(
            pages,
            |i| {
                let c = contact(i);
                record([
                    ("name", json!(c.name)),
                    ("address", json!({ "city": c.city })),
                ])
            },
            page,
            page_size,
        )
    });
    host.scroll_to_end();

    println!("== declared markup ==");
    println!("{}", host.markup()?);
    println!("{:?}", host.grid().stats());
    Ok(())
}

fn typed_grid(pages: usize, config: GridConfig) -> anyhow::Result<()> {
    let templates = GridTemplates::new(
        || -> RenderResult {
            Ok(Element::new("tr")
                .child(Element::new("th").child(RenderNode::text("Contact")))
                .into())
        },
        |c: &Contact, index: usize| -> RenderResult {
            let name = Element::new("h4")
                .attr("part", "name")
                .child(RenderNode::text(c.name.clone()));
            let city = Element::new("span")
                .attr("part", "city")
                .child(RenderNode::text(c.city.clone()));
            Ok(Element::new("tr")
                .key(index as u64)
                .child(Element::new("td").child(name).child(city))
                .into())
        },
    );

    let mut host = Host::new(config, templates, 300.0, 60.0)?;
    host.grid().set_fetch_source(move |page: usize, page_size: usize| {
        page_of(pages, contact, page, page_size)
    });
    host.scroll_to_end();

    println!("== typed rows ==");
    println!("{}", host.markup()?);
    println!("{:?}", host.grid().stats());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::init();

    let pages = env_knob("GRID_DEMO_PAGES", DEFAULT_PAGES, MAX_PAGES)?;
    let page_size = env_knob("GRID_DEMO_PAGE_SIZE", DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let config = GridConfig::new().with_page_size(page_size);
    config.validate().context("invalid demo configuration")?;

    declared_grid(pages, config.clone())?;
    typed_grid(pages, config)?;
    Ok(())
}
