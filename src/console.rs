//! Interactive console loop.
//!
//! Reads one topic per line.  Every line except an exit keyword becomes a
//! request, including an empty one.  End of input also ends the loop.

use std::io::{self, BufRead, Write};

use crate::pipeline::PipelineResult;

/// Lines that end the session, compared case-insensitively.
pub const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

const PROMPT: &str = "请输入诗歌主题 (输入 exit 或 quit 退出): ";

/// `true` if `line` is one of [`EXIT_KEYWORDS`] in any letter case.
pub fn is_exit_command(line: &str) -> bool {
    EXIT_KEYWORDS.iter().any(|k| line.eq_ignore_ascii_case(k))
}

/// Run the prompt loop over `input`, handing each topic to `handler`.
///
/// Returns the number of requests served.
pub fn run_console<R, W, F>(mut input: R, mut output: W, mut handler: F) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> PipelineResult,
{
    writeln!(output, "=== 诗歌生成器 ===")?;

    let mut served = 0;
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let topic = line.trim_end_matches(['\r', '\n']);

        if is_exit_command(topic) {
            break;
        }

        let result = handler(topic);
        served += 1;
        report(&mut output, &result)?;
    }

    writeln!(output, "再见!")?;
    log::info!("console: session ended after {served} request(s)");
    Ok(served)
}

fn report<W: Write>(output: &mut W, result: &PipelineResult) -> io::Result<()> {
    match result.poem() {
        Some(poem) => {
            writeln!(output, "\n{poem}\n")?;
            if result.audio().is_none() {
                writeln!(output, "(语音合成失败)")?;
            }
        }
        None => writeln!(output, "诗歌生成失败，请重试。")?,
    }
    Ok(())
}
