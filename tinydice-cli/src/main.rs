use std::{path::PathBuf, rc::Rc};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tinydice::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dice notation to sample, e.g. 2d6
    #[arg(required = true, value_name = "NOTATION")]
    notations: Vec<String>,

    /// Number of rolls sampled per notation
    #[arg(short = 'n', long, default_value_t = 100_000)]
    samples: u64,

    /// Random seed for reproducibility
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Flat bonus added to every roll (may be negative)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    bonus: i64,

    /// Roll twice and keep the higher total
    #[arg(long, default_value_t = false, conflicts_with = "disadvantage")]
    advantage: bool,

    /// Roll twice and keep the lower total
    #[arg(long, default_value_t = false)]
    disadvantage: bool,

    /// Widest histogram bar, in characters
    #[arg(long, default_value_t = 50)]
    width: usize,

    /// Write the sampled distributions to this JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl Args {
    fn operands(&self, roll: &Roll) -> Vec<Operand> {
        let mut operands: Vec<Operand> = vec![roll.clone().into()];
        if self.advantage {
            operands.push(roll.clone().into());
            operands.push(advantage().into());
        } else if self.disadvantage {
            operands.push(roll.clone().into());
            operands.push(disadvantage().into());
        }
        if self.bonus != 0 {
            operands.push(plus(self.bonus).into());
        }
        operands
    }

    /// Theoretical statistics only hold for the bare dice.
    fn expected(&self, spec: DiceSpec) -> Option<SampleSummary> {
        if self.advantage || self.disadvantage || self.bonus != 0 {
            return None;
        }
        SampleSummary::expected(spec)
    }
}

#[derive(Debug, Serialize)]
struct Distribution {
    notation: String,
    samples: u64,
    summary: Option<SampleSummary>,
    expected: Option<SampleSummary>,
    frequencies: Vec<(i64, f64)>,
}

fn print_histogram(
    f: &mut impl std::fmt::Write,
    notation: &str,
    sample: &Sample,
    expected: Option<SampleSummary>,
    width: usize,
) -> std::fmt::Result {
    writeln!(f, "{notation} ({} rolls)", sample.len())?;
    if let Some(summary) = sample.summary() {
        writeln!(f, "mean {:.2}, std dev {:.2}", summary.mean, summary.std_dev)?;
    }
    if let Some(expected) = expected {
        writeln!(
            f,
            "expected mean {:.2}, std dev {:.2}",
            expected.mean, expected.std_dev
        )?;
    }

    let frequencies = sample.frequencies();
    let peak = frequencies
        .iter()
        .map(|&(_, frequency)| frequency)
        .fold(0.0, f64::max);
    let label_width = frequencies
        .iter()
        .map(|(value, _)| value.to_string().len())
        .max()
        .unwrap_or(1);

    for (value, frequency) in frequencies {
        let bar = if peak > 0.0 {
            (frequency / peak * width as f64).round() as usize
        } else {
            0
        };
        writeln!(
            f,
            "{value:>label_width$} {:>6.2}% {}",
            frequency * 100.0,
            "#".repeat(bar)
        )?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .init();
    log::info!("Starting sampling with args: {:?}", args);

    let specs = args
        .notations
        .iter()
        .map(|notation| {
            notation
                .parse::<DiceSpec>()
                .with_context(|| format!("Invalid dice notation {notation:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let roller = match args.seed {
        Some(seed) => Roller::from_seed(seed),
        None => Roller::new(),
    };

    let start_time = chrono::Utc::now();
    let mut distributions = Vec::with_capacity(specs.len());

    for (notation, spec) in args.notations.iter().zip(specs) {
        let random: Rc<dyn RandomSource> = Rc::new(roller.fork());
        let roll = RollBuilder::new(spec).shared_random(random).build()?;

        log::info!("Sampling {} rolls of {}...", args.samples, notation);
        let sampled = sample(args.samples, || modify(args.operands(&roll)))?;

        let expected = args.expected(spec);
        let mut buf = String::new();
        print_histogram(&mut buf, notation, &sampled, expected, args.width)?;
        println!("{buf}");

        distributions.push(Distribution {
            notation: notation.clone(),
            samples: sampled.len(),
            summary: sampled.summary(),
            expected,
            frequencies: sampled.frequencies(),
        });
    }

    let elapsed = chrono::Utc::now() - start_time;
    log::info!(
        "Sampling complete: {} distribution(s) in {} ms",
        distributions.len(),
        elapsed.num_milliseconds()
    );

    if let Some(output) = &args.output {
        let file = std::fs::File::create(output)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &distributions)?;
        log::info!("Distributions written to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["tinydice", "2d6", "1d20"]).unwrap();
        assert_eq!(args.notations, vec!["2d6", "1d20"]);
        assert_eq!(args.samples, 100_000);
        assert_eq!(args.bonus, 0);
        assert!(args.seed.is_none());
        assert!(args.output.is_none());
    }

    #[test]
    fn test_args_conflicts() {
        assert!(Args::try_parse_from(["tinydice"]).is_err());
        assert!(
            Args::try_parse_from(["tinydice", "1d20", "--advantage", "--disadvantage"]).is_err()
        );
        let args = Args::try_parse_from(["tinydice", "1d20", "--bonus", "-2"]).unwrap();
        assert_eq!(args.bonus, -2);
    }

    #[test]
    fn test_operands_apply_flags() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["tinydice", "1d6", "--advantage", "--bonus", "3"])?;
        let roll = RollBuilder::new("1d6").random(Constant(0.0)).build()?;
        assert_eq!(args.operands(&roll).len(), 4);
        assert_eq!(modify(args.operands(&roll))?, 4);

        assert!(args.expected(roll.spec()).is_none());

        let args = Args::try_parse_from(["tinydice", "1d6"])?;
        assert_eq!(args.operands(&roll).len(), 1);
        assert!(args.expected(roll.spec()).is_some());
        Ok(())
    }

    #[test]
    fn test_print_histogram() -> anyhow::Result<()> {
        let mut sampled = Sample::new();
        for value in [1, 2, 2, 2] {
            sampled.record(value);
        }

        let mut buf = String::new();
        let expected = SampleSummary::expected(DiceSpec::new(1, 2));
        print_histogram(&mut buf, "1d2", &sampled, expected, 10)?;
        let lines: Vec<&str> = buf.lines().collect();
        assert_eq!(lines[0], "1d2 (4 rolls)");
        assert_eq!(lines[1], "mean 1.75, std dev 0.50");
        assert_eq!(lines[2], "expected mean 1.50, std dev 0.50");
        assert_eq!(lines[3], "1  25.00% ###");
        assert_eq!(lines[4], "2  75.00% ##########");
        Ok(())
    }
}
