use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

// Import environment utilities
use genefit_env::get_run_dir;

// Import the test functions and metadata
use genefit_testfunctions::{function_names, get_function_metadata};

use genefit_ss::{LocalSearch, OptimizationRecorder, SSConfig, scatter_search};

/// CLI arguments for running Scatter Search on a benchmark function
#[derive(Parser)]
#[command(name = "run_ss")]
#[command(about = "Minimize a benchmark function with Scatter Search")]
struct Args {
	/// Benchmark function name
	#[arg(short, long, default_value = "quadratic")]
	function: String,

	/// Dimension (scalable functions only); defaults to the function's own
	#[arg(short = 'n', long)]
	dim: Option<usize>,

	/// JSON configuration file; command-line options override it
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Random seed
	#[arg(short, long)]
	seed: Option<u64>,

	/// Iteration budget
	#[arg(short = 'i', long)]
	max_iter: Option<usize>,

	/// Local search method (hillclimb, neldermead); enables local search
	#[arg(short, long)]
	local_search: Option<LocalSearch>,

	/// Resume from the final state written to this directory
	#[arg(long)]
	warm_start: Option<PathBuf>,

	/// Output directory for history, final state and records
	#[arg(short, long)]
	output_dir: Option<PathBuf>,

	/// Do not write per-iteration history files
	#[arg(long)]
	no_history: bool,

	/// Log every iteration
	#[arg(long)]
	disp: bool,

	/// List available functions and exit
	#[arg(long)]
	list: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();
	let args = Args::parse();

	let metadata = get_function_metadata();
	if args.list {
		for name in function_names() {
			let meta = &metadata[&name];
			println!("{:<18} {}D  {}", name, meta.bounds.len(), meta.description);
		}
		return Ok(());
	}

	let meta = metadata
		.get(&args.function)
		.ok_or_else(|| format!("unknown function '{}' (try --list)", args.function))?;
	let n = args.dim.unwrap_or(meta.bounds.len());
	let bounds = meta
		.bounds_for(n)
		.ok_or_else(|| format!("{} does not accept dimension {}", meta.name, n))?;

	let mut config = match &args.config {
		Some(path) => SSConfig::load_json(path)?,
		None => SSConfig::default(),
	};
	if let Some(seed) = args.seed {
		config.seed = Some(seed);
	}
	if let Some(max_iter) = args.max_iter {
		config.max_iter = max_iter;
	}
	if let Some(method) = args.local_search {
		config.perform_local_search = true;
		config.local_search = method;
	}
	if let Some(dir) = args.warm_start {
		config.perform_warm_start = true;
		config.warm_start_dir = Some(dir);
	}
	config.disp |= args.disp;

	let output_dir = match args.output_dir {
		Some(dir) => dir,
		None => get_run_dir(&meta.name)?,
	};
	if !args.no_history {
		config.history_dir.get_or_insert_with(|| output_dir.clone());
	}
	config.export_dir.get_or_insert_with(|| output_dir.clone());

	let recorder = OptimizationRecorder::new(meta.name.clone());
	config.callback = Some(recorder.create_callback());

	log::info!("running {} in {} dimensions, output in {}", meta.name, n, output_dir.display());
	let report = scatter_search(&meta.function, &bounds, config)?;
	let csv_path = recorder.save_to_csv(&output_dir)?;

	println!("function: {}", meta.name);
	println!("message:  {}", report.message);
	println!("best:     {:.8e} (known minimum {:.6})", report.fun, meta.min_value());
	println!("x:        {:?}", report.x.to_vec());
	println!("iterations: {}, evaluations: {}", report.nit, report.nfev);
	println!("{}", serde_json::to_string_pretty(&report.stats)?);
	println!("trace:    {}", csv_path.display());

	Ok(())
}
