use anyhow::{Context, Result, bail};
use cert_layout::{
    CertificatesPerPage, GenerateOptions, Orientation, PageSize, Record, Template, VariableResolver,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "certgen", about = "Certificate layout and generation CLI", version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default certificate template
    Init {
        /// Output template JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Certificates per page (1-3)
        #[arg(long, default_value = "1")]
        per_page: f64,

        /// Page orientation
        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,
    },

    /// Validate a template and report its slot layout
    Check {
        /// Template JSON
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Show page statistics for a set of records
    Stats {
        /// Template JSON
        #[arg(short, long)]
        template: PathBuf,

        /// Records file (.csv with a header row, or .json array)
        #[arg(short, long)]
        records: PathBuf,
    },

    /// Render one page filled with example values
    Preview {
        /// Template JSON
        #[arg(short, long)]
        template: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory for relative image and background paths
        #[arg(long)]
        asset_dir: Option<PathBuf>,
    },

    /// Generate certificates for every record
    Generate {
        /// Template JSON
        #[arg(short, long)]
        template: PathBuf,

        /// Records file (.csv with a header row, or .json array)
        #[arg(short, long)]
        records: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Repeat each record into every slot of its own page
        #[arg(long)]
        fill_page: bool,

        /// Draw dashed dividers between slots
        #[arg(long)]
        dividers: bool,

        /// Directory for relative image and background paths
        #[arg(long)]
        asset_dir: Option<PathBuf>,

        /// Document title
        #[arg(long, default_value = "Certificates")]
        title: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

async fn load_records(path: &Path) -> Result<Vec<Record>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let records = if is_json {
        cert_layout::load_records_json(path).await
    } else {
        cert_layout::load_records_csv(path).await
    };
    records.with_context(|| format!("Failed to load records from {}", path.display()))
}

async fn load_template(path: &Path) -> Result<Template> {
    Template::load(path)
        .await
        .with_context(|| format!("Failed to load template {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Init {
            output,
            per_page,
            orientation,
        } => {
            let mut template = cert_layout::default_template();
            template.certificates_per_page = CertificatesPerPage::from_raw(per_page);
            if matches!(orientation, OrientationArg::Landscape) {
                let PageSize { width, height, .. } = template.page_size;
                template.page_size = PageSize {
                    width: width.max(height),
                    height: width.min(height),
                    orientation: orientation.into(),
                };
            }
            template.save(&output).await?;
            println!("Template → {}", output.display());
        }

        Commands::Check { template } => {
            let template = load_template(&template).await?;
            let layout = cert_layout::PageLayout::output(&template);
            let resolver = VariableResolver::new(&template.available_variables);

            println!("Template: {}", template.name);
            println!(
                "  Page: {}x{}pt ({:?})",
                template.page_size.width, template.page_size.height, template.page_size.orientation
            );
            println!("  Certificates per page: {}", layout.per_page.get());
            for slot in &layout.slots {
                println!(
                    "  Slot {}: offset {:.2}pt, height {:.2}pt, text scale {}",
                    slot.index + 1,
                    slot.offset_y,
                    slot.height,
                    slot.text_scale
                );
            }
            println!("  Elements: {}", template.elements().count());
            let flags = resolver.flag_keys();
            if !flags.is_empty() {
                let flags: Vec<_> = flags.into_iter().collect();
                println!("  Checkbox flags: {}", flags.join(", "));
            }

            let undeclared = template.undeclared_variables();
            if !undeclared.is_empty() {
                bail!("Undeclared placeholders: {}", undeclared.join(", "));
            }
            println!("OK");
        }

        Commands::Stats { template, records } => {
            let template = load_template(&template).await?;
            let records = load_records(&records).await?;
            let stats = cert_layout::calculate_statistics(&template, records.len())?;
            println!("Generation Statistics:");
            println!("  Records: {}", stats.records);
            println!("  Certificates per page: {}", stats.certificates_per_page);
            println!("  Pages: {}", stats.pages);
            println!("  Empty slots: {}", stats.empty_slots);
        }

        Commands::Preview {
            template,
            output,
            asset_dir,
        } => {
            let template = load_template(&template).await?;
            let options = GenerateOptions {
                asset_dir,
                title: format!("{} (preview)", template.name),
                ..Default::default()
            };
            let bytes = cert_layout::generate_preview(&template, &options).await?;
            cert_layout::save_pdf(&bytes, &output).await?;
            println!("Preview → {}", output.display());
        }

        Commands::Generate {
            template,
            records,
            output,
            fill_page,
            dividers,
            asset_dir,
            title,
        } => {
            let template = load_template(&template).await?;
            let records = load_records(&records).await?;
            let options = GenerateOptions {
                asset_dir,
                title,
                draw_dividers: dividers,
                fill_page,
            };
            let bytes = cert_layout::generate_pdf(&template, &records, &options).await?;
            cert_layout::save_pdf(&bytes, &output).await?;
            println!("Generated {} certificate(s) → {}", records.len(), output.display());
        }
    }

    Ok(())
}
