#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;

use std::default::Default;
use std::io::Write;
use std::path::PathBuf;

use minisat_rust::sat::minisat::{CCMinMode, CoreSettings, PhaseSaving, RestartStrategy};
use minisat_rust::{solve, MainOptions, SolverOptions};


fn main() {
    let ls012 = ["0", "1", "2"];
    let matches = clap::App::new("minisat-rust")
        .version(&crate_version!()[..])
        .about("A MiniSAT-lineage CDCL solver")
        .arg(clap::Arg::with_name("verb").long("verb").takes_value(true).possible_values(&ls012)
            .help("Verbosity level (0=silent, 1=some, 2=more)"))
        .arg(clap::Arg::with_name("strict").long("strict").help("Validate the DIMACS header while parsing"))
        .arg(clap::Arg::with_name("no-pre").long("no-pre").help("Skip the unit-propagation preprocessing pass"))
        .arg(clap::Arg::with_name("no-solve").long("no-solve").help("Stop after preprocessing, before search"))
        .arg(clap::Arg::with_name("dimacs").long("dimacs").takes_value(true).requires("no-solve")
            .help("If given with --no-solve, write the preprocessed formula here"))
        .arg(clap::Arg::with_name("input").required(true))
        .arg(clap::Arg::with_name("output").required(false))
        .arg(clap::Arg::with_name("var-decay").long("var-decay").takes_value(true)
            .help("Variable activity decay factor"))
        .arg(clap::Arg::with_name("cla-decay").long("cla-decay").takes_value(true)
            .help("Clause activity decay factor"))
        .arg(clap::Arg::with_name("rnd-freq").long("rnd-freq").takes_value(true)
            .help("Frequency with which the decision heuristic picks a random variable"))
        .arg(clap::Arg::with_name("rnd-seed").long("rnd-seed").takes_value(true)
            .help("Seed used by the random variable selection"))
        .arg(clap::Arg::with_name("ccmin-mode").long("ccmin-mode").takes_value(true).possible_values(&ls012)
            .help("Conflict clause minimization (0=none, 1=basic, 2=deep)"))
        .arg(clap::Arg::with_name("phase-saving").long("phase-saving").takes_value(true).possible_values(&ls012)
            .help("Phase saving level (0=none, 1=limited, 2=full)"))
        .arg(clap::Arg::with_name("rnd-init").long("rnd-init").help("Randomize the initial variable activity"))
        .arg(clap::Arg::with_name("luby").long("luby").help("Use the Luby restart sequence (default)"))
        .arg(clap::Arg::with_name("geometric").long("geometric").conflicts_with("luby")
            .help("Use a geometric restart sequence instead of Luby"))
        .arg(clap::Arg::with_name("rfirst").long("rfirst").takes_value(true)
            .help("Base restart interval"))
        .arg(clap::Arg::with_name("rinc").long("rinc").takes_value(true)
            .help("Restart interval growth factor"))
        .arg(clap::Arg::with_name("gc-frac").long("gc-frac").takes_value(true)
            .help("Fraction of wasted clause memory allowed before garbage collection"))
        .arg(clap::Arg::with_name("min-learnts").long("min-learnts").takes_value(true)
            .help("Minimum learnt clause limit"))
        .arg(clap::Arg::with_name("rcheck").long("rcheck").help("Check whether an added clause is already implied (costly)"))
        .get_matches();

    {
        let level = match matches.value_of("verb") {
            Some("0") => log::LevelFilter::Off,
            Some("2") => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        };
        env_logger::Builder::new()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .filter(None, level)
            .init();
    }

    let core_options = {
        let mut s: CoreSettings = Default::default();

        if let Some(x) = matches.value_of("var-decay").and_then(|v| v.parse::<f64>().ok()) {
            if 0.0 < x && x < 1.0 {
                s.heur.var_decay = x;
            }
        }

        if let Some(x) = matches.value_of("cla-decay").and_then(|v| v.parse::<f64>().ok()) {
            if 0.0 < x && x < 1.0 {
                s.db.clause_decay = x;
            }
        }

        if let Some(x) = matches.value_of("rnd-freq").and_then(|v| v.parse::<f64>().ok()) {
            if 0.0 <= x && x <= 1.0 {
                s.heur.random_var_freq = x;
            }
        }

        if let Some(x) = matches.value_of("rnd-seed").and_then(|v| v.parse::<f64>().ok()) {
            if 0.0 < x {
                s.heur.random_seed = x;
            }
        }

        match matches.value_of("ccmin-mode") {
            Some("0") => s.ccmin_mode = CCMinMode::None,
            Some("1") => s.ccmin_mode = CCMinMode::Basic,
            Some("2") => s.ccmin_mode = CCMinMode::Deep,
            _ => {}
        }

        match matches.value_of("phase-saving") {
            Some("0") => s.heur.phase_saving = PhaseSaving::None,
            Some("1") => s.heur.phase_saving = PhaseSaving::Limited,
            Some("2") => s.heur.phase_saving = PhaseSaving::Full,
            _ => {}
        }

        if matches.is_present("rnd-init") {
            s.heur.rnd_init_act = true;
        }

        {
            let restart_first = matches.value_of("rfirst").and_then(|v| v.parse::<f64>().ok()).filter(|&x| x > 0.0);
            let restart_inc = matches.value_of("rinc").and_then(|v| v.parse::<f64>().ok()).filter(|&x| x > 1.0);
            if matches.is_present("geometric") {
                s.search.restart = RestartStrategy::Geometric {
                    restart_first: restart_first.unwrap_or(100.0),
                    restart_inc: restart_inc.unwrap_or(2.0),
                };
            } else if restart_first.is_some() || restart_inc.is_some() {
                s.search.restart = RestartStrategy::Luby {
                    restart_first: restart_first.unwrap_or(100.0),
                    restart_inc: restart_inc.unwrap_or(2.0),
                };
            }
        }

        if let Some(x) = matches.value_of("gc-frac").and_then(|v| v.parse::<f64>().ok()) {
            if 0.0 < x && x <= 1.0 {
                s.core.garbage_frac = x;
            }
        }

        if let Some(x) = matches.value_of("min-learnts").and_then(|v| v.parse::<i32>().ok()) {
            if x >= 0 {
                s.search.learn.min_learnts_lim = x;
            }
        }

        if matches.is_present("rcheck") {
            s.core.use_rcheck = true;
        }

        s
    };

    let options = MainOptions {
        strict: matches.is_present("strict"),
        pre: !matches.is_present("no-pre"),
        solve: !matches.is_present("no-solve"),
        in_path: PathBuf::from(matches.value_of("input").unwrap()),
        out_path: matches.value_of("output").map(PathBuf::from),
        dimacs_path: matches.value_of("dimacs").map(PathBuf::from),
    };

    solve(options, SolverOptions::Core(core_options)).expect("solve failed");
}
