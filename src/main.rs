use clap::{Parser, Subcommand};
use concrete_site::calculators::{self, CalculatorInput};
use concrete_site::config;
use concrete_site::content::ContentCache;
use concrete_site::output;
use concrete_site::site::{self, Request, Site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "concrete-site")]
#[command(about = "Concrete calculators and a Markdown blog, served or exported as HTML")]
#[command(long_about = "\
Concrete calculators and a Markdown blog, served or exported as HTML

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── categories.json              # [{ \"slug\", \"name\", \"description\" }]
  └── posts/
      ├── ordering-ready-mix.md    # /blog/ordering-ready-mix
      └── guides/
          └── footing-basics.md    # /blog/guides/footing-basics

Post files start with YAML frontmatter; `title` and `date` are required:

  ---
  title: Ordering ready-mix
  date: 2024-04-02
  category: mix
  tags: [ready-mix, ordering]
  ---

Set RUST_LOG=debug for per-file detail.

Run 'concrete-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CalcArgs {
    /// Calculator slug: slab, footing, wall, beam, round-column, square-column
    calculator: String,
    #[arg(long)]
    length: Option<String>,
    #[arg(long)]
    width: Option<String>,
    /// Depth, thickness, or column height
    #[arg(long, alias = "height")]
    depth: Option<String>,
    #[arg(long)]
    diameter: Option<String>,
    /// Unit for length, width and column height (ft, in, m)
    #[arg(long)]
    unit: Option<String>,
    /// Unit for depth and column cross-section (ft, in, m)
    #[arg(long)]
    depth_unit: Option<String>,
    /// Waste allowance in percent
    #[arg(long)]
    waste: Option<String>,
}

impl CalcArgs {
    /// The same key/value pairs the calculator form submits.
    fn to_query(&self) -> Vec<(String, String)> {
        [
            ("length", &self.length),
            ("width", &self.width),
            ("depth", &self.depth),
            ("diameter", &self.diameter),
            ("unit", &self.unit),
            ("depth_unit", &self.depth_unit),
            ("waste", &self.waste),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
        .collect()
    }
}

#[derive(Subcommand)]
enum Command {
    /// Export every canonical page, sitemap.xml and robots.txt
    Build,
    /// Load config, parse every post and report problems
    Check,
    /// Render one route (e.g. "/blog/category/mix?page=2") to stdout
    Render {
        /// Request path, optionally with a query string
        path: String,
    },
    /// Print a volume and material estimate
    Calc(CalcArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            let cache = ContentCache::from_config(&site_config, &cli.source);
            let site = Site::new(&site_config, &cache);
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let summary = site::export(&site, &cli.output)?;
            output::print_build_output(&summary, &cli.output);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            let cache = ContentCache::from_config(&site_config, &cli.source);
            let report = cache.report();
            output::print_check_output(&report, &cache.get_categories(), &cache.get_all_posts());
            if !report.is_clean() {
                return Err("content has problems".into());
            }
            println!("==> Content is valid");
        }
        Command::Render { path } => {
            let site_config = config::load_config(&cli.source)?;
            let cache = ContentCache::from_config(&site_config, &cli.source);
            let response = Site::new(&site_config, &cache).handle(&Request::parse(&path));
            eprintln!("{} {}", response.status, response.content_type);
            print!("{}", response.body);
        }
        Command::Calc(args) => {
            let calc = calculators::find_calculator(&args.calculator)
                .ok_or_else(|| format!("unknown calculator: {}", args.calculator))?;
            let site_config = config::load_config(&cli.source)?;
            let input = CalculatorInput::from_query(
                &args.to_query(),
                site_config.calculator.default_waste_percent,
            )?;
            let estimate = calculators::evaluate(calc, &input)?;
            output::print_calc_output(calc, &estimate);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
