use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use infografia::export::{ExportFormat, Exporter};
use infografia::extract::{extract, ExtractPolicy};
use infografia::preview::PreviewPage;
use infografia::relay::{self, RelayEndpoint};
use infografia::session::{App, Screen};
use infografia::{Backend, ConsoleNotifier, DirectorySink, ExportConfig, RasterHandle, Viewport};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "infografia", version, about = "Preview and export design-tool HTML as PNG or PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct PolicyArgs {
    /// CORS relay prefix for absolute image URLs
    #[arg(long, default_value = relay::DEFAULT_RELAY)]
    relay: String,
    /// Leave image URLs untouched
    #[arg(long)]
    no_relay: bool,
    /// Check that the relay answers before using it
    #[arg(long)]
    probe_relay: bool,
    /// Keep `&nbsp;` entities in the body markup
    #[arg(long)]
    keep_nbsp: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the extracted body, styles and head resources as JSON
    Extract {
        /// HTML file, or `-` for stdin
        input: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Write the composed preview document
    Preview {
        input: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Rasterize the preview and save it as PNG or PDF
    Export {
        input: String,
        #[arg(short, long, value_enum, default_value = "png")]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value = "wireframe")]
        backend: BackendArg,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Pdf,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Wireframe,
    Chrome,
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))
    }
}

fn build_policy(args: &PolicyArgs) -> anyhow::Result<ExtractPolicy> {
    let relay = if args.no_relay {
        None
    } else {
        let endpoint = RelayEndpoint::new(&args.relay)?;
        if args.probe_relay && !relay::probe(&endpoint, Duration::from_secs(5)) {
            log::warn!("Relay {} is unreachable; image URLs will not be rewritten", endpoint.as_str());
            None
        } else {
            Some(endpoint)
        }
    };
    let mut policy = ExtractPolicy::cleaning(relay);
    policy.strip_nbsp = !args.keep_nbsp;
    Ok(policy)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract { input, policy } => {
            let html = read_input(&input)?;
            let policy = build_policy(&policy)?;
            let doc = extract(Some(&html), &policy);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Preview { input, output, policy } => {
            let html = read_input(&input)?;
            let page = open_preview(html, build_policy(&policy)?);
            let composed = page.compose();
            match output {
                Some(path) => std::fs::write(&path, composed).with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", composed),
            }
            if page.is_error() {
                anyhow::bail!("nothing to preview");
            }
        }
        Command::Export {
            input,
            format,
            out_dir,
            backend,
            width,
            policy,
        } => {
            let html = read_input(&input)?;
            let mut page = open_preview(html, build_policy(&policy)?);
            if page.is_error() {
                anyhow::bail!("nothing to export");
            }

            let config = ExportConfig {
                viewport: Viewport { width, ..Viewport::default() },
                ..ExportConfig::default()
            };
            let backend = match backend {
                BackendArg::Wireframe => Backend::Wireframe,
                BackendArg::Chrome => Backend::Chrome,
            };
            let format = match format {
                FormatArg::Png => ExportFormat::Png,
                FormatArg::Pdf => ExportFormat::Pdf,
            };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("starting async runtime")?;
            let saved = runtime.block_on(async {
                let factory_config = config.clone();
                let handle = match RasterHandle::spawn(move || infografia::new_rasterizer(backend, &factory_config)).await {
                    Ok(h) => Some(h),
                    Err(e) => {
                        log::error!("Failed to start rasterizer: {}", e);
                        None
                    }
                };
                let mut exporter = Exporter::new(handle.clone(), ConsoleNotifier, DirectorySink::new(&out_dir), config);
                let artifact = exporter.export(&mut page, format).await;
                if let Some(h) = handle {
                    if let Err(e) = h.close().await {
                        log::warn!("Rasterizer did not close cleanly: {}", e);
                    }
                }
                artifact
            });

            match saved {
                Some(artifact) => println!("{}", out_dir.join(artifact.filename()).display()),
                None => std::process::exit(1),
            }
        }
    }
    Ok(())
}

/// Walk the same route a user would: fill the form, submit, land on the preview.
fn open_preview(html: String, policy: ExtractPolicy) -> PreviewPage {
    let mut app = App::new(policy.clone());
    let nav = match app.screen_mut() {
        Screen::Home(home) => {
            home.set_html(html);
            home.submit(&ConsoleNotifier)
        }
        Screen::Preview(_) => None,
    };
    if let Some(nav) = nav {
        app.navigate(nav);
    }
    match app.screen() {
        Screen::Preview(page) => page.clone(),
        Screen::Home(_) => PreviewPage::new(None, policy),
    }
}
