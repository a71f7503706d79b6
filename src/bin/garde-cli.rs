#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use garde::{
    io,
    model::ShiftData,
    stats::{sort_statistics, StatsSort},
    swap::{suggest_swaps, SwapQuery},
    validation::{error_counts, validate_with, ValidationError},
    Settings,
};
use clap::{Parser, Subcommand};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'analyse de tableaux de garde (CSV, XLSX, ODS)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Réglages JSON (seuils de repos, limites d'échanges)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Afficher les intervalles extraits
    Parse {
        #[arg(long)]
        input: String,
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Vérifier les conflits
    Check {
        #[arg(long)]
        input: String,
        #[arg(long)]
        min_rest_hours: Option<f64>,
        /// Export CSV des erreurs (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Statistiques par médecin
    Stats {
        #[arg(long)]
        input: String,
        /// hours | days | name
        #[arg(long, default_value = "hours")]
        sort: StatsSort,
        /// Rapport complet (erreurs + statistiques) en JSON
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Proposer des échanges pour un médecin/jour
    Swaps {
        #[arg(long)]
        input: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        day: u32,
        /// liste "3,4,5"
        #[arg(long, value_delimiter = ',')]
        days: Vec<u32>,
        /// liste "ali,veli"
        #[arg(long, value_delimiter = ',')]
        doctors: Vec<String>,
        #[arg(long)]
        max_conflicts: Option<usize>,
        #[arg(long)]
        max_results: Option<usize>,
    },
}

fn load(input: &str) -> Result<ShiftData> {
    io::load_shift_data(input).or_else(|errors| {
        print_errors(&errors);
        bail!("cannot load roster {input}")
    })
}

fn print_errors(errors: &[ValidationError]) {
    for e in errors {
        let day = e.day.map(|d| format!("day {d}")).unwrap_or_else(|| "-".into());
        eprintln!("[{:?}/{:?}] {} | {}", e.severity, e.kind, day, e.message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let mut settings = match &cli.config {
        Some(path) => garde::load_settings(path)?,
        None => Settings::default(),
    };

    let code = match cli.cmd {
        Commands::Parse { input, out_json } => {
            let data = load(&input)?;
            if let Some(path) = out_json {
                io::export_json(path, &data)?;
            }
            println!("{} | {} day(s) | {} shift(s)", data.month, data.entries.len(), data.all_shifts.len());
            for s in &data.all_shifts {
                println!(
                    "{:>2} | {:<8} | {} → {} | {} | {}",
                    s.day,
                    s.shift_type,
                    s.start_date_time,
                    s.end_date_time,
                    s.doctor_name,
                    if s.region.is_empty() { "-" } else { s.region.as_str() }
                );
            }
            0
        }
        Commands::Check {
            input,
            min_rest_hours,
            report,
        } => {
            if let Some(h) = min_rest_hours {
                settings.validation.min_rest_hours = h;
            }
            settings.validate()?;
            let data = load(&input)?;
            let errors = validate_with(&data.all_shifts, settings.validation);
            if let Some(path) = report {
                io::export_errors_csv(path, &errors)?;
            }
            if errors.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                let (errs, warnings) = error_counts(&errors);
                eprintln!("Found {errs} error(s), {warnings} warning(s)");
                print_errors(&errors);
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Stats {
            input,
            sort,
            out_json,
        } => {
            let data = load(&input)?;
            let mut report = io::analyze(&data, &settings);
            sort_statistics(&mut report.statistics, sort);
            if let Some(path) = out_json {
                io::export_json(path, &report)?;
            }
            let summary = &report.summary;
            println!(
                "{} | {} doctor(s) | {} shift(s) | {}h | {:.1}h/doctor",
                report.month,
                summary.total_doctors,
                summary.total_shifts,
                summary.total_hours,
                summary.average_hours_per_doctor
            );
            for st in &report.statistics {
                let days: Vec<String> = st.sorted_days().iter().map(u32::to_string).collect();
                println!(
                    "{} | {} day(s) | {}h | 24h:{} 16h:{} 12h:{} 8h:{} | {}",
                    st.name,
                    st.total_days,
                    st.total_hours,
                    st.shifts24h,
                    st.shifts16h,
                    st.shifts12h,
                    st.shifts8h,
                    days.join(", ")
                );
            }
            0
        }
        Commands::Swaps {
            input,
            doctor,
            day,
            days,
            doctors,
            max_conflicts,
            max_results,
        } => {
            if let Some(n) = max_conflicts {
                settings.swaps.max_conflicts = n;
            }
            if let Some(n) = max_results {
                settings.swaps.max_results = n;
            }
            settings.validate()?;
            let data = load(&input)?;
            let mut query = SwapQuery::new();
            if !days.is_empty() {
                query = query.with_days(days);
            }
            if !doctors.is_empty() {
                query = query.with_doctors(doctors);
            }
            let suggestions = suggest_swaps(&data.all_shifts, &doctor, day, &query, settings.swaps);
            if suggestions.is_empty() {
                println!("No feasible swap: requires manual coordination");
            }
            for s in &suggestions {
                let tag = if s.is_recommended() { "recommended" } else { "possible" };
                println!("[{tag}] {}", s.reasoning);
                for c in &s.conflicts {
                    println!("    - {c}");
                }
            }
            0
        }
    };

    std::process::exit(code);
}
