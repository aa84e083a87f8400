use std::fs;
use std::path::PathBuf;

use anyhow::{ Context, Result };
use clap::Parser;
use tracing::{ info, warn };
use tracing_subscriber::EnvFilter;

use asmgen::harness::render_c_header;
use asmgen::{ Dialect, FailurePolicy, GenConfig, SweepBounds };
use asmgen_probes::{ build_suite, ProbeId };

/// Generate scheduler capacity microbenchmarks.
///
/// Writes one assembly source file and one C header per dialect into the
/// output directory. Set RUST_LOG=debug to list every generated function.
#[derive(Parser)]
#[command(verbatim_doc_comment)]
pub struct Args {
    /// A comma-separated list of probes to generate (default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    probes: Vec<ProbeId>,

    /// A comma-separated list of dialects to generate (default: all)
    #[arg(long, value_enum, value_delimiter = ',')]
    dialects: Vec<Dialect>,

    /// Count sweep, as 'low:high:step' or 'low:high'
    #[arg(long, default_value_t = GenConfig::DEFAULT_BOUNDS)]
    bounds: SweepBounds,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Prefix for output file names
    #[arg(long, default_value = GenConfig::DEFAULT_STEM)]
    stem: String,

    /// What to do with probes that can't be rendered for some dialect
    #[arg(long, value_enum, default_value_t = FailurePolicy::Halt)]
    policy: FailurePolicy,

    /// Align the top of the measured loop to 2^n bytes
    #[arg(long, default_value_t = 6)]
    loop_align: u32,

    /// Don't align the measured loop
    #[arg(long)]
    no_align: bool,

    /// Don't write C headers
    #[arg(long)]
    no_header: bool,
}
impl Args {
    fn config(&self) -> GenConfig {
        let mut cfg = GenConfig::default()
            .bounds(self.bounds)
            .policy(self.policy)
            .stem(self.stem.as_str())
            .out_dir(&self.out_dir)
            .loop_align(if self.no_align { None } else { Some(self.loop_align) });
        if !self.dialects.is_empty() {
            cfg = cfg.dialects(&self.dialects);
        }
        cfg
    }

    fn probes(&self) -> Vec<ProbeId> {
        if self.probes.is_empty() {
            ProbeId::ALL.to_vec()
        } else {
            self.probes.clone()
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let arg = Args::parse();
    let cfg = arg.config();
    let probes = arg.probes();

    let suite = build_suite(&probes, &cfg)
        .with_context(|| format!("building suite with bounds {}", cfg.bounds))?;
    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("creating {}", cfg.out_dir.display()))?;

    let mut skipped = 0;
    for dialect in cfg.dialects.iter().copied() {
        let rendered = suite.render(dialect, cfg.policy)
            .with_context(|| format!("rendering {}", dialect))?;
        for (probe, err) in rendered.skipped.iter() {
            warn!(%dialect, probe = probe.as_str(), "left out: {}", err);
        }
        skipped += rendered.skipped.len();

        let path = cfg.output_path(dialect);
        fs::write(&path, &rendered.text)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(%dialect, path = %path.display(),
            probes = suite.len() - rendered.skipped.len(), "wrote source");

        if !arg.no_header {
            let path = cfg.header_path(dialect);
            fs::write(&path, render_c_header(&suite, dialect))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(%dialect, path = %path.display(), "wrote header");
        }
    }
    if skipped > 0 {
        warn!(skipped, "some probes were left out, see above");
    }
    Ok(())
}
