use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sim_figures::api::{CollectorConfig, FigureCollector, FigureRegistry};
use sim_figures::core::{
    AimodelPlotdata, DEFAULT_FIGURE_NAMES, DiagnosticsInput, Figure, FigureFamily, PlotSource,
    Trace, TraceKind,
};
use sim_figures::error::{FigureError, FigureResult};
use sim_figures::invoke::CancelToken;

const SAMPLE_LEN: usize = 48;

#[derive(Debug)]
struct CliArgs {
    config_path: Option<PathBuf>,
    timeout_secs: Option<f64>,
    selected_vars: Vec<String>,
    slow_figure: Option<String>,
}

/// Deterministic stand-in for a finished simulation run.
#[derive(Debug)]
struct SyntheticSim {
    times: Vec<f64>,
    pdr_profit: Vec<f64>,
    trader_profit: Vec<f64>,
    accuracy: Vec<f64>,
    ptrue: Vec<f64>,
    log_loss: Vec<f64>,
    plotdata: AimodelPlotdata,
}

impl SyntheticSim {
    fn new() -> FigureResult<Self> {
        let times: Vec<f64> = (0..SAMPLE_LEN).map(|i| i as f64).collect();
        let wave = |scale: f64, phase: f64| -> Vec<f64> {
            times
                .iter()
                .map(|t| scale * (0.3 * t + phase).sin())
                .collect()
        };
        let pdr_profit = cumulative(&wave(1.5, 0.0));
        let trader_profit = cumulative(&wave(0.8, 1.1));
        let accuracy = times.iter().map(|t| 0.5 + 0.2 * (1.0 - (-t / 12.0).exp())).collect();
        let ptrue = times.iter().map(|t| 0.5 + 0.4 * (0.17 * t).sin()).collect();
        let log_loss = times.iter().map(|t| 0.69 - 0.2 * (1.0 - (-t / 20.0).exp())).collect();

        let colnames = vec!["close_lag1".to_owned(), "close_lag2".to_owned(), "volume".to_owned()];
        let x_train: Vec<Vec<f64>> = times
            .iter()
            .map(|t| vec![(0.2 * t).sin(), (0.2 * t - 0.2).sin(), 1.0 + (0.05 * t).cos()])
            .collect();
        let ytrue_train = x_train.iter().map(|row| row[0] > row[1]).collect();
        let plotdata = AimodelPlotdata::new(colnames, x_train, ytrue_train, vec![0.0, 0.0, 1.0])?
            .with_varimps(vec![0.55, 0.35, 0.10])?;

        Ok(Self {
            times,
            pdr_profit,
            trader_profit,
            accuracy,
            ptrue,
            log_loss,
            plotdata,
        })
    }

    fn line(&self, title: &str, values: &[f64], y_title: &str) -> Figure {
        Figure::new(title)
            .with_trace(Trace::new(title, TraceKind::Line, self.times.clone(), values.to_vec()))
            .with_axis_titles("time", y_title)
    }

    fn versus_ptrue(&self, title: &str, profit: &[f64]) -> Figure {
        Figure::new(title)
            .with_trace(Trace::new(title, TraceKind::Scatter, self.ptrue.clone(), profit.to_vec()))
            .with_axis_titles("prob(true)", "profit")
    }
}

impl PlotSource for SyntheticSim {
    fn aimodel_plotdata(&self) -> Option<&AimodelPlotdata> {
        Some(&self.plotdata)
    }
}

fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

fn plot_varimps(input: &DiagnosticsInput<'_>) -> Figure {
    let plotdata = input.plotdata();
    let positions = (0..plotdata.colnames().len()).map(|i| i as f64).collect();
    Figure::new("aimodel_varimps")
        .with_trace(Trace::new(
            "importance",
            TraceKind::Bar,
            positions,
            plotdata.varimps().to_vec(),
        ))
        .with_axis_titles(input.sweep_colnames().join(", "), "importance")
}

fn plot_response(input: &DiagnosticsInput<'_>, token: &CancelToken) -> FigureResult<Figure> {
    let plotdata = input.plotdata();
    let sweep = input.sweep_vars().unwrap_or_default();
    let Some((&column, colname)) = sweep
        .first()
        .and_then(|column| Some((column, plotdata.colnames().get(*column)?)))
    else {
        return Err(FigureError::render(
            "aimodel_response",
            "select at least one sweep variable",
        ));
    };

    let mut x = Vec::with_capacity(plotdata.x_train().len());
    let mut y = Vec::with_capacity(plotdata.x_train().len());
    for (row, label) in plotdata.x_train().iter().zip(plotdata.ytrue_train()) {
        if token.is_cancelled() {
            break;
        }
        x.push(row[column]);
        y.push(if *label { 1.0 } else { 0.0 });
    }
    Ok(Figure::new("aimodel_response")
        .with_trace(Trace::new("ytrue", TraceKind::Scatter, x, y))
        .with_axis_titles(colname.clone(), "ytrue"))
}

fn build_registry(
    config: &CollectorConfig,
    slow_figure: Option<&str>,
) -> FigureResult<FigureRegistry<SyntheticSim>> {
    let mut registry = FigureRegistry::with_diagnostics_prefix(config.diagnostics_prefix.clone());
    for name in DEFAULT_FIGURE_NAMES {
        let slow = slow_figure == Some(name);
        match (config.family_of(name), name) {
            (FigureFamily::ModelDiagnostics, "aimodel_varimps") => {
                registry.register_diagnostics(name, move |input, token| {
                    stall_if(slow, token);
                    Ok(plot_varimps(input))
                })?;
            }
            (FigureFamily::ModelDiagnostics, _) => {
                registry.register_diagnostics(name, move |input, token| {
                    stall_if(slow, token);
                    plot_response(input, token)
                })?;
            }
            (FigureFamily::Standard, _) => {
                registry.register_standard(name, move |sim: &SyntheticSim, token| {
                    stall_if(slow, token);
                    Ok(match name {
                        "pdr_profit_vs_time" => sim.line(name, &sim.pdr_profit, "OCEAN"),
                        "trader_profit_vs_time" => sim.line(name, &sim.trader_profit, "USD"),
                        "accuracy_vs_time" => sim.line(name, &sim.accuracy, "accuracy"),
                        "pdr_profit_vs_ptrue" => sim.versus_ptrue(name, &sim.pdr_profit),
                        "trader_profit_vs_ptrue" => sim.versus_ptrue(name, &sim.trader_profit),
                        "log_loss_vs_time" => sim.line(name, &sim.log_loss, "log loss"),
                        _ => sim.line(name, &sim.accuracy, "score"),
                    })
                })?;
            }
        }
    }
    Ok(registry)
}

fn stall_if(slow: bool, token: &CancelToken) {
    while slow && !token.is_cancelled() {
        thread::sleep(Duration::from_millis(10));
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let _ = sim_figures::telemetry::init_default_tracing();

    let mut config = match &args.config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            CollectorConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => CollectorConfig::default(),
    };
    if let Some(timeout_secs) = args.timeout_secs {
        config = config.with_timeout_secs(timeout_secs);
    }

    let registry =
        build_registry(&config, args.slow_figure.as_deref()).map_err(|err| err.to_string())?;
    let timeout = config.timeout().map_err(|err| err.to_string())?;
    let collector = FigureCollector::new(registry, config).map_err(|err| err.to_string())?;
    let sim = Arc::new(SyntheticSim::new().map_err(|err| err.to_string())?);

    let report = collector
        .collect_with_report(&sim, args.selected_vars.as_slice(), timeout)
        .map_err(|err| err.to_string())?;
    let serialized = report.to_json_string().map_err(|err| err.to_string())?;
    println!("{serialized}");
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut config_path = None;
    let mut timeout_secs = None;
    let mut selected_vars = vec!["close_lag1".to_owned()];
    let mut slow_figure = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "--timeout" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --timeout".to_owned())?;
                let parsed = value
                    .parse::<f64>()
                    .map_err(|err| format!("invalid --timeout `{value}`: {err}"))?;
                timeout_secs = Some(parsed);
            }
            "--select" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --select".to_owned())?;
                selected_vars = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            "--slow" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --slow".to_owned())?;
                slow_figure = Some(value);
            }
            "-h" | "--help" => {
                println!(
                    "Usage: cargo run --bin figure_collect_probe -- [--config <path>] [--timeout <secs>] [--select <a,b>] [--slow <figure>]"
                );
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`"));
            }
        }
    }

    Ok(CliArgs {
        config_path,
        timeout_secs,
        selected_vars,
        slow_figure,
    })
}
