use std::{
    env, process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, bail};
use log::{info, warn};
use tokio::{
    io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader},
    signal, task,
};

use font_shade::{
    ParamSnapshot, SearchConfig, SearchLoop, TrainingSet,
    predict::{accuracy, predict},
};

const PROMPT: &str = "Predict light or dark font. Input values R,G,B: ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <colors.csv> [config.json]", args[0]);
        process::exit(1);
    }

    let data = TrainingSet::from_csv_path(&args[1])
        .with_context(|| format!("loading training data from {}", args[1]))?;
    info!("loaded {} samples from {}", data.len(), args[1]);

    let config = match args.get(2) {
        Some(path) => SearchConfig::from_json_path(path)
            .with_context(|| format!("loading search config from {path}"))?,
        None => SearchConfig::default(),
    };

    let stop = Arc::new(AtomicBool::new(false));
    let mut handle = {
        let stop = Arc::clone(&stop);
        task::spawn_blocking(move || {
            let outcome = SearchLoop::new(config, &data)?.run_until(&stop)?;
            let acc = accuracy(&outcome.best, &data);
            anyhow::Ok((outcome, acc))
        })
    };

    let search = tokio::select! {
        ret = &mut handle => ret,
        _ = signal::ctrl_c() => {
            warn!("received SIGINT, stopping the search");
            stop.store(true, Ordering::Relaxed);
            handle.await
        }
    };

    let (outcome, acc) = search.context("search task panicked")??;
    println!(
        "best loss {:.6} (initial {:.6}) after {} iterations, training accuracy {:.1}%",
        outcome.best_loss,
        outcome.initial_loss,
        outcome.state.iteration,
        acc * 100.
    );

    if outcome.stopped_early {
        return Ok(());
    }

    tokio::select! {
        ret = prompt_loop(&outcome.best) => ret?,
        _ = signal::ctrl_c() => info!("received SIGINT, bye"),
    }

    Ok(())
}

/// Reads `R,G,B` lines from stdin and prints the chosen font until EOF.
async fn prompt_loop(best: &ParamSnapshot) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match parse_rgb(&line).and_then(|[r, g, b]| Ok(predict(best, r, g, b)?)) {
            Ok(shade) => stdout.write_all(format!("{shade}\n").as_bytes()).await?,
            Err(e) => eprintln!("{e:#}"),
        }
    }
}

fn parse_rgb(line: &str) -> anyhow::Result<[i64; 3]> {
    let fields: Vec<_> = line.split(',').map(str::trim).collect();
    let [r, g, b] = fields.as_slice() else {
        bail!("expected three comma separated values, got '{}'", line.trim());
    };

    let parse = |s: &str| {
        s.parse::<i64>()
            .with_context(|| format!("'{s}' is not an integer"))
    };
    Ok([parse(*r)?, parse(*g)?, parse(*b)?])
}
