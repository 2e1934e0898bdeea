//! Interactive terminal game
//!
//! Same pages as the web frontend, read from and written to any
//! `BufRead`/`Write` pair. Charts can't be drawn inline, so they are
//! optionally written next to the game as SVG files.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::chart;
use crate::config::GameConfig;
use crate::engine::Session;
use crate::error::TrainerError;
use crate::presentation::{handle, render_text, Event, Page, ScenarioView};
use crate::types::{EntryChoice, ExitChoice};

/// Options for one terminal game
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub config: GameConfig,
    pub chart_seed: u64,
    /// Directory to write each scenario chart into
    pub chart_dir: Option<PathBuf>,
}

/// Play one session to the end, or until input runs out.
///
/// Returns the finished session.
pub fn play<R: BufRead, W: Write>(input: R, mut output: W, options: &PlayOptions) -> Result<Session> {
    let mut lines = input.lines();

    let (mut session, render) = handle(
        Session::new(options.config.clone(), options.chart_seed),
        Event::View,
    );
    let mut render = render?;

    loop {
        write!(output, "{}", render_text(&render))?;

        let Page::Playing { scenario, .. } = &render.page else {
            break;
        };

        if let Some(dir) = &options.chart_dir {
            let path = write_chart(dir, scenario)?;
            writeln!(output, "Chart: {}", path.display())?;
        }

        let Some(entry) = prompt::<EntryChoice, _, _>(
            &mut lines,
            &mut output,
            "Choose your entry (long/short/skip): ",
        )?
        else {
            info!("Input closed at scenario {}", scenario.number);
            return Ok(session);
        };
        let Some(exit) = prompt::<ExitChoice, _, _>(
            &mut lines,
            &mut output,
            "Choose your exit strategy (smart/greedy): ",
        )?
        else {
            info!("Input closed at scenario {}", scenario.number);
            return Ok(session);
        };

        let (next, result) = handle(session, Event::Submit { entry, exit });
        session = next;
        render = result?;
        writeln!(output)?;
    }

    output.flush()?;
    Ok(session)
}

/// Ask until the answer parses; None when input is exhausted
fn prompt<T, I, W>(lines: &mut I, output: &mut W, label: &str) -> Result<Option<T>>
where
    T: FromStr<Err = TrainerError>,
    I: Iterator<Item = std::io::Result<String>>,
    W: Write,
{
    loop {
        write!(output, "{}", label)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        match line?.parse::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(e) => {
                debug!("Rejected input: {}", e);
                writeln!(output, "{}", e)?;
            }
        }
    }
}

fn write_chart(dir: &Path, scenario: &ScenarioView) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;

    let svg = chart::generate(scenario.chart.kind, scenario.chart.seed)?
        .render_svg(chart::DEFAULT_WIDTH, chart::DEFAULT_HEIGHT)?;

    let path = dir.join(format!("{:02}-{}.svg", scenario.number, scenario.chart.kind));
    std::fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn options() -> PlayOptions {
        PlayOptions {
            config: GameConfig::default(),
            chart_seed: 11,
            chart_dir: None,
        }
    }

    #[test]
    fn test_play_full_game() {
        let input = "short\nsmart\nlong\nsmart\nlong\nsmart\nlong\ngreedy\n";
        let mut output = Vec::new();
        let session = play(Cursor::new(input), &mut output, &options()).unwrap();

        assert!(session.is_over());
        assert_eq!(session.balance(), 11_300);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Poor exit at holding during pullback!"));
        assert!(text.contains("Final Balance: $11300"));
        assert!(text.contains("Well done! You made profitable decisions."));
    }

    #[test]
    fn test_play_reprompts_on_invalid_input() {
        let input = "buy\nSKIP\nhold\ngreedy\n";
        let mut output = Vec::new();
        let session = play(Cursor::new(input), &mut output, &options()).unwrap();

        // Input ran out during scenario 2
        assert!(!session.is_over());
        assert_eq!(session.scenario_index(), 1);
        assert_eq!(session.balance(), 10_000);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Invalid entry choice: buy"));
        assert!(text.contains("Invalid exit choice: hold"));
        assert!(text.contains("Skipped the trade."));
    }

    #[test]
    fn test_play_writes_charts() {
        let dir = std::env::temp_dir().join(format!("setup-trainer-{}", uuid::Uuid::new_v4()));
        let options = PlayOptions {
            chart_dir: Some(dir.clone()),
            ..options()
        };

        let mut output = Vec::new();
        play(Cursor::new("skip\nsmart\n"), &mut output, &options).unwrap();

        assert!(dir.join("01-liquidity.svg").exists());
        assert!(dir.join("02-fvg.svg").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
