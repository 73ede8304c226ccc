//! Command-line argument definition and processing.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

use crate::args::output::{render_options, render_units};
use crate::codec::CodecError;
use crate::engine::FacetEngine;
use crate::index::{Catalog, CatalogError, JsonTagStore, PersistError, load_tags};
use crate::settings::{Settings, expand_home};
use crate::state::{FilterRegistry, SortDirection, SortKey};

/// unitfacet - Faceted search over game-unit catalogs
#[derive(Parser, Debug, Default)]
#[command(name = "unitfacet")]
#[command(version)]
#[command(about = "Faceted search, tri-state filtering, and shareable URL state for unit catalogs", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Catalog JSON file (overrides `data_path` in settings.conf)
    #[arg(short, long)]
    pub data: Option<String>,

    /// Tag store JSON file (overrides `tags_path` in settings.conf)
    #[arg(long)]
    pub tags: Option<String>,

    /// Restore the session from a URL query string (e.g., "q=atlas&sort=bv")
    #[arg(short, long)]
    pub url: Option<String>,

    /// Free-text search; commas or semicolons separate alternatives
    #[arg(short, long)]
    pub search: Option<String>,

    /// Compact filter string (e.g., "weightClass:Heavy|equipment:PPC.,AC%2F20!")
    #[arg(short, long)]
    pub filters: Option<String>,

    /// Sort key (name, bv, pv, tons, armor, internal, walk, run, jump, heat, dissipation, year, cost, type, role, techBase, weightClass)
    #[arg(long, value_parser = parse_sort_key)]
    pub sort: Option<SortKey>,

    /// Sort in descending order
    #[arg(long)]
    pub desc: bool,

    /// Pilot gunnery skill (0-8)
    #[arg(long, allow_hyphen_values = true)]
    pub gunnery: Option<i64>,

    /// Pilot piloting skill (0-8)
    #[arg(long, allow_hyphen_values = true)]
    pub piloting: Option<i64>,

    /// Set tags on a unit and save them (e.g., --tag 12=favorite,lance-a); repeatable
    #[arg(long = "tag", value_name = "ID=TAGS")]
    pub tag: Vec<String>,

    /// Print filter options instead of results
    #[arg(short, long)]
    pub options: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Maximum result rows to print (defaults to `result_limit` in settings.conf)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the shareable query string after the results
    #[arg(long)]
    pub print_url: bool,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a sort key flag value.
fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    SortKey::from_key(raw).ok_or_else(|| format!("unknown sort key: {raw}"))
}

/// What: Failure while running a CLI request.
///
/// Inputs:
/// - Produced by [`run`].
///
/// Output:
/// - Displayed by `main` before exiting with a non-zero status.
#[derive(Debug)]
pub enum CliError {
    /// Neither `--data` nor `data_path` names a catalog.
    MissingCatalog,
    /// The catalog could not be loaded.
    Catalog(CatalogError),
    /// The `--filters` string could not be decoded.
    Filters(CodecError),
    /// A `--tag` value was malformed or named an unknown unit.
    InvalidTag(String),
    /// Tags were edited but no tag store is configured.
    MissingTagStore,
    /// Tags could not be saved.
    Persist(PersistError),
    /// JSON output could not be produced.
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCatalog => {
                write!(f, "no catalog given; pass --data or set data_path in settings.conf")
            }
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Filters(e) => write!(f, "{e}"),
            Self::InvalidTag(raw) => write!(f, "invalid --tag value: {raw}"),
            Self::MissingTagStore => {
                write!(f, "no tag store given; pass --tags or set tags_path in settings.conf")
            }
            Self::Persist(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "failed to render JSON: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::Filters(e) => Some(e),
            Self::Persist(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::MissingCatalog | Self::InvalidTag(_) | Self::MissingTagStore => None,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        Self::Filters(e)
    }
}

impl From<PersistError> for CliError {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// What: Parse one `--tag` value.
///
/// Inputs:
/// - `raw`: `ID=tag1,tag2`; an empty tag list clears the unit's tags.
///
/// Output:
/// - Unit id and trimmed, non-empty tags, or `None` when the id is not a number.
fn parse_tag_arg(raw: &str) -> Option<(u32, Vec<String>)> {
    let (id, tags) = raw.split_once('=')?;
    let id = id.trim().parse::<u32>().ok()?;
    let tags = tags
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect();
    Some((id, tags))
}

/// What: Load the catalog named by flags or settings and overlay saved tags.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `settings`: Loaded settings.
///
/// Output:
/// - Loaded catalog and the resolved tag store path, if any.
///
/// # Errors
/// - `CliError::MissingCatalog` when no path is configured.
/// - `CliError::Catalog` when the file cannot be read or parsed.
///
/// Details:
/// - A missing or unreadable tag file is logged and skipped.
pub fn load_catalog(args: &Args, settings: &Settings) -> Result<(Catalog, Option<PathBuf>), CliError> {
    let data_path = args
        .data
        .as_deref()
        .map(expand_home)
        .or_else(|| settings.data_path.clone())
        .ok_or(CliError::MissingCatalog)?;
    let mut catalog = Catalog::load_from_path(&data_path)?;
    let tags_path = args
        .tags
        .as_deref()
        .map(expand_home)
        .or_else(|| settings.tags_path.clone());
    if let Some(path) = tags_path.as_deref()
        && path.is_file()
    {
        match load_tags(path) {
            Ok(tags) => {
                let applied = catalog.apply_tags(&tags);
                tracing::debug!(path = %path.display(), applied, "applied saved tags");
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to load tags"),
        }
    }
    Ok((catalog, tags_path))
}

/// What: Apply flag overrides on top of the restored session.
///
/// Inputs:
/// - `engine`: Engine to update.
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - `Ok(())` once every override is applied.
///
/// # Errors
/// - `CliError::Filters` when `--filters` has invalid percent-encoding.
pub fn apply_overrides(engine: &mut FacetEngine<Catalog>, args: &Args) -> Result<(), CliError> {
    if let Some(compact) = &args.filters {
        engine.apply_filter_string(compact)?;
    }
    if let Some(q) = &args.search {
        engine.set_search(q.clone());
    }
    if args.sort.is_some() || args.desc {
        let key = args.sort.unwrap_or(engine.session().sort_key);
        let dir = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        engine.set_sort(key, dir);
    }
    if args.gunnery.is_some() || args.piloting.is_some() {
        let s = engine.session();
        let g = args.gunnery.unwrap_or_else(|| i64::from(s.gunnery));
        let p = args.piloting.unwrap_or_else(|| i64::from(s.piloting));
        engine.set_skills(g, p);
    }
    Ok(())
}

/// What: Apply `--tag` edits and save every unit's tags.
///
/// Inputs:
/// - `engine`: Engine whose catalog is edited.
/// - `edits`: Raw `--tag` values.
/// - `tags_path`: Resolved tag store path.
///
/// Output:
/// - `Ok(())` after the store confirms the save; nothing happens without edits.
///
/// # Errors
/// - `CliError::InvalidTag`, `CliError::MissingTagStore`, or `CliError::Persist`.
pub async fn apply_tag_edits(
    engine: &mut FacetEngine<Catalog>,
    edits: &[String],
    tags_path: Option<PathBuf>,
) -> Result<(), CliError> {
    if edits.is_empty() {
        return Ok(());
    }
    let path = tags_path.ok_or(CliError::MissingTagStore)?;
    for raw in edits {
        let (id, tags) = parse_tag_arg(raw).ok_or_else(|| CliError::InvalidTag(raw.clone()))?;
        if !engine.catalog_mut().set_tags(id, tags) {
            return Err(CliError::InvalidTag(raw.clone()));
        }
    }
    let store = JsonTagStore::new(path);
    engine.persist_tags(&store).await?;
    tracing::info!(path = %store.path().display(), edits = edits.len(), "tags saved");
    Ok(())
}

/// What: Run one CLI request and render its output.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
/// - `settings`: Loaded settings.
///
/// Output:
/// - Text or JSON to print on stdout.
///
/// # Errors
/// - Any [`CliError`] raised while loading, filtering, saving tags, or rendering.
///
/// Details:
/// - Order: `--url`, then settings defaults the URL left unset, then individual
///   flags, so flags win.
/// - The printed query string keeps foreign parameters from `--url` verbatim.
pub async fn run(args: &Args, settings: &Settings) -> Result<String, CliError> {
    let (catalog, tags_path) = load_catalog(args, settings)?;
    let mut engine = FacetEngine::new(catalog, FilterRegistry::standard())
        .with_cache_capacity(settings.option_cache_capacity);
    if let Some(query) = &args.url {
        engine.restore_from_query(query);
    }
    if settings.expanded && !engine.session().expanded {
        engine.set_expanded(true);
    }
    apply_overrides(&mut engine, args)?;
    apply_tag_edits(&mut engine, &args.tag, tags_path).await?;

    let limit = args.limit.unwrap_or(settings.result_limit);
    let url = args.print_url.then(|| {
        args.url
            .as_deref()
            .map_or_else(|| engine.to_query_string(), |q| engine.merge_into_query(q))
    });
    if args.options {
        render_options(&engine.filter_options(), url.as_deref(), args.json)
    } else {
        render_units(&engine, limit, url.as_deref(), args.json)
    }
}
