use clap::{App, Arg, SubCommand};
use hmmtag::{HiddenMarkovModel, TrainConfig};
use rayon::prelude::*;
#[macro_use]
extern crate log;

fn verbose_arg() -> Arg<'static, 'static> {
    Arg::with_name("verbose")
        .short("v")
        .multiple(true)
        .help("Debug mode")
}

fn subcommand_train() -> App<'static, 'static> {
    SubCommand::with_name("train")
        .version("0.1")
        .about("Estimate the parameters from an observation sequence by Baum-Welch.")
        .arg(verbose_arg())
        .arg(
            Arg::with_name("observations")
                .long("observations")
                .short("i")
                .value_name("FILE")
                .takes_value(true)
                .help("Whitespace separated integers. Read stdin if absent."),
        )
        .arg(
            Arg::with_name("states")
                .long("states")
                .short("s")
                .takes_value(true)
                .required(true)
                .help("Number of hidden states."),
        )
        .arg(
            Arg::with_name("symbols")
                .long("symbols")
                .takes_value(true)
                .help("Size of the alphabet. [default: max symbol + 1]"),
        )
        .arg(
            Arg::with_name("max_iter")
                .long("max_iter")
                .takes_value(true)
                .default_value("100")
                .help("Number of re-estimation steps."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("Start from random parameters with this seed. Uniform if absent."),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .value_name("JSON")
                .takes_value(true)
                .help("Output file of the parameters. Write stdout if absent."),
        )
}

fn subcommand_decode() -> App<'static, 'static> {
    SubCommand::with_name("decode")
        .version("0.1")
        .about("Decode the most probable state sequence of each line.")
        .arg(verbose_arg())
        .arg(
            Arg::with_name("model")
                .long("model")
                .short("m")
                .value_name("JSON")
                .takes_value(true)
                .required(true)
                .help("Parameters written by `train`."),
        )
        .arg(
            Arg::with_name("observations")
                .long("observations")
                .short("i")
                .value_name("FILE")
                .takes_value(true)
                .help("One sequence per line. Read stdin if absent."),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads"),
        )
}

fn subcommand_evaluate() -> App<'static, 'static> {
    SubCommand::with_name("evaluate")
        .version("0.1")
        .about("Decode an observation sequence and score it against the true states.")
        .arg(verbose_arg())
        .arg(
            Arg::with_name("model")
                .long("model")
                .short("m")
                .value_name("JSON")
                .takes_value(true)
                .required(true)
                .help("Parameters written by `train`."),
        )
        .arg(
            Arg::with_name("observations")
                .long("observations")
                .short("i")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("Whitespace separated integers."),
        )
        .arg(
            Arg::with_name("states")
                .long("states")
                .short("s")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("True states, whitespace separated integers."),
        )
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> std::io::Result<T> {
    let value = matches.value_of(name).unwrap_or_default();
    value.parse().map_err(|_| {
        let msg = format!("invalid value {:?} for --{}", value, name);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, msg)
    })
}

fn train(matches: &clap::ArgMatches) -> std::io::Result<()> {
    let observations = hmmtag::corpus::read_observations(&matches.value_of("observations"))?;
    let num_states: usize = parse_arg(matches, "states")?;
    let num_observations: usize = match matches.value_of("symbols") {
        Some(_) => parse_arg(matches, "symbols")?,
        None => observations.iter().max().map(|&x| x + 1).unwrap_or(0),
    };
    let seed: Option<u64> = match matches.value_of("seed") {
        Some(_) => Some(parse_arg(matches, "seed")?),
        None => None,
    };
    let config = TrainConfig::new(parse_arg(matches, "max_iter")?, seed);
    debug!("Observations:{}", observations.len());
    debug!("Config:{:?}", config);
    let mut model = config.initial_model(num_states, num_observations)?;
    let summary = model.train_with_config(&observations, &config)?;
    info!(
        "Iterations:{}\tLK:{:.4}",
        summary.iterations, summary.log_likelihood
    );
    trace!("\n{}", model);
    match matches.value_of("output") {
        Some(path) => hmmtag::persist::save_to_file(path, &model)?,
        None => {
            let stdout = std::io::stdout();
            let mut wtr = std::io::BufWriter::new(stdout.lock());
            write_model(&mut wtr, &model)?;
        }
    }
    Ok(())
}

fn write_model<W: std::io::Write>(wtr: &mut W, model: &HiddenMarkovModel) -> std::io::Result<()> {
    hmmtag::persist::save(wtr, model)?;
    wtr.flush()
}

fn load_model(matches: &clap::ArgMatches) -> std::io::Result<HiddenMarkovModel> {
    let path = matches.value_of("model").unwrap_or_default();
    let model = hmmtag::persist::load_from_file(path)?;
    debug!(
        "Loaded {} states and {} symbols from {}",
        model.num_states(),
        model.num_observations(),
        path
    );
    Ok(model)
}

fn decode(matches: &clap::ArgMatches) -> std::io::Result<()> {
    let model = load_model(matches)?;
    let sequences = hmmtag::corpus::read_sequences(&matches.value_of("observations"))?;
    debug!("Decoding {} sequences", sequences.len());
    let decoded: Vec<_> = sequences
        .par_iter()
        .map(|obs| model.decode(obs))
        .collect::<hmmtag::Result<_>>()?;
    use std::io::Write;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for states in decoded {
        let states: Vec<_> = states.iter().map(|s| s.to_string()).collect();
        writeln!(wtr, "{}", states.join(" "))?;
    }
    wtr.flush()
}

fn evaluate(matches: &clap::ArgMatches) -> std::io::Result<()> {
    let model = load_model(matches)?;
    let observations = hmmtag::corpus::read_observations(&matches.value_of("observations"))?;
    let true_states = hmmtag::corpus::read_observations(&matches.value_of("states"))?;
    let decoded = model.decode(&observations)?;
    let accuracy = hmmtag::metrics::accuracy(&true_states, &decoded)?;
    println!("Decoding accuracy: {:.2}%", accuracy);
    println!("state\tprecision\trecall\tf1\tsupport");
    let num_states = true_states.iter().max().map_or(0, |&x| x + 1);
    let num_states = num_states.max(model.num_states());
    for score in hmmtag::metrics::report(&true_states, &decoded, num_states)? {
        println!("{}", score);
    }
    Ok(())
}

fn main() -> std::io::Result<()> {
    let matches = App::new("hmmtag")
        .version("0.1")
        .about("Train:[INTEGERS]->JSON, Decode:JSON x [INTEGERS]->[STATES], Evaluate:JSON x [INTEGERS] x [STATES]->SCORES")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_train())
        .subcommand(subcommand_decode())
        .subcommand(subcommand_evaluate())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        if let Some(threads) = sub_m.value_of("threads").and_then(|x| x.parse().ok()) {
            if let Err(why) = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
            {
                debug!("{:?}", why);
            }
        }
    }
    debug!("Start");
    match matches.subcommand() {
        ("train", Some(sub_m)) => train(sub_m),
        ("decode", Some(sub_m)) => decode(sub_m),
        ("evaluate", Some(sub_m)) => evaluate(sub_m),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    // Accepts every write, fails on flush.
    struct BrokenPipe(Vec<u8>);
    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }
    #[test]
    fn write_model_test() {
        let model = HiddenMarkovModel::new(2, 3).unwrap();
        let mut buffer = vec![];
        write_model(&mut buffer, &model).unwrap();
        let restored = hmmtag::persist::load(buffer.as_slice()).unwrap();
        assert_eq!(model, restored);
        let mut wtr = std::io::BufWriter::new(BrokenPipe(vec![]));
        let result = write_model(&mut wtr, &model);
        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::BrokenPipe);
    }
}
