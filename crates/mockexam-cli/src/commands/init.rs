//! The `mockexam init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("mockexam.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("problems")?;
    write_if_missing(Path::new("problems/sample.tex"), SAMPLE_PROBLEMS)?;

    println!("\nNext steps:");
    println!("  1. Add your own .tex files to problems/");
    println!("  2. Run: mockexam validate");
    println!("  3. Run: mockexam generate --count 3");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mockexam configuration

problems_dir = "problems"
progress_file = "progress.json"
output_dir = "output"

default_questions = 5
max_questions = 50
one_per_topic = false

# "preserve" keeps the session log when every question has been solved and
# the pool starts over; "clear" drops it.
history_on_reset = "preserve"
reset_on_shortfall = false

# seed = 42
"#;

const SAMPLE_PROBLEMS: &str = r"\section*{Sample}

\begin{problem}
Compute $\displaystyle\int_0^1 x^2 \, dx$.
\end{problem}
\begin{solution}
$\frac{1}{3}$
\end{solution}

\begin{problem}
Find all real $x$ with $x^2 - 5x + 6 = 0$.
\end{problem}
\begin{solution}
$x = 2$ or $x = 3$.
\end{solution}

\begin{problem}
Show that $\sqrt{2}$ is irrational.
\end{problem}
";
