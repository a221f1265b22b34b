//! Implementation of `wheelyard render`.
//!
//! Writes a PEP 503 "simple" index of every published wheel: one page per
//! package plus a root page. Pages are written to a staging directory next
//! to the target and moved into place once complete.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::release::{ReleaseSnapshot, Wheel};
use crate::core::version::Version;
use crate::ops::plan::{load_snapshot, release_source, ReleaseSource};
use crate::util::fs::{ensure_dir, replace_dir, write_string};
use crate::util::GlobalContext;

/// Title of the root page.
const ROOT_TITLE: &str = "Available packages";

/// Options for the render command.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory to write the index to
    pub target: PathBuf,

    /// Release feed (default: `net.repository`, then the current git remote)
    pub releases: Option<ReleaseSource>,
}

/// What was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub packages: usize,
    pub wheels: usize,
}

/// Load the release feed and render it.
pub fn render(ctx: &GlobalContext, opts: &RenderOptions) -> Result<RenderSummary> {
    let source = release_source(ctx, opts.releases.as_ref())?;
    let snapshot = load_snapshot(ctx, &source)?;
    render_index(&snapshot, &ctx.resolve_path(&opts.target))
}

/// Render `snapshot` into `target`, replacing whatever is there.
pub fn render_index(snapshot: &ReleaseSnapshot, target: &Path) -> Result<RenderSummary> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".wheelyard-render-")
        .tempdir_in(parent)
        .with_context(|| format!("failed to create staging directory in {}", parent.display()))?;

    let latest = snapshot.latest_versions();
    let mut summary = RenderSummary::default();

    for (package, wheels) in snapshot.packages() {
        let page = package_page(package, wheels);
        write_string(&staging.path().join(package).join("index.html"), &page)?;
        summary.packages += 1;
        summary.wheels += wheels.len();
    }
    write_string(&staging.path().join("index.html"), &root_page(&latest))?;

    replace_dir(staging.path(), target)?;

    tracing::info!(
        "Rendered {} package(s), {} wheel(s) to {}",
        summary.packages,
        summary.wheels,
        target.display()
    );
    Ok(summary)
}

/// Page listing the wheels of one package, in listing order.
pub fn package_page(package: &str, wheels: &[Wheel]) -> String {
    let mut items = String::new();
    for wheel in wheels {
        let _ = write!(
            items,
            "    <li><a href=\"{}#{}\">\n      {}\n    </a></li>\n",
            escape_html(wheel.url()),
            escape_html(&wheel.digest().fragment()),
            escape_html(wheel.filename())
        );
    }
    page(package, &items)
}

/// Page listing every package with its latest version.
pub fn root_page<'a>(latest: impl IntoIterator<Item = (&'a String, &'a Version)>) -> String {
    let mut items = String::new();
    for (package, version) in latest {
        let _ = write!(
            items,
            "    <li>\n      <a href=\"{}/\">{}</a>\n      <span> (latest: {})</span>\n    </li>\n",
            escape_html(package),
            escape_html(package),
            escape_html(&version.to_string())
        );
    }
    page(ROOT_TITLE, &items)
}

fn page(title: &str, items: &str) -> String {
    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <title>{title}</title>\n</head>\n<body>\n  <h1>{title}</h1>\n  <ul>\n{items}  </ul>\n</body>\n</html>\n"
    )
}

/// Escape text for use in element content and quoted attributes.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
