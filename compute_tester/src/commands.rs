// THEORY:
// Each subcommand turns its arguments (and, for file-backed commands, the decoded
// file contents) into one `Operation`, runs it through the same `Limits` check
// and `execute` path the server uses, and describes the outcome as a `Report`.
// Decoding is the tester's job, not the engines': text files are read as UTF-8,
// matrices use the engine's text form, images go through `image`.
//
// A `Report` is plain data so it can be asserted on; `main` does the colouring.

use anyhow::{Context, bail};
use clap::Subcommand;
use compute_engine::core_modules::matrix::parse_matrix_text;
use compute_engine::engine::{GrayscaleMethod, NumberListInput, PixelBuffer};
use compute_engine::{Limits, NumericInput, Operation, Outcome, Scalar, execute};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Terms shown before a long sequence is elided.
const PREVIEW_LEN: usize = 10;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Exact factorial of N
    Factorial { n: String },

    /// First N Fibonacci numbers (F1 = 0)
    Fibonacci {
        n: String,

        /// Print every term instead of a preview
        #[arg(long)]
        show_terms: bool,
    },

    /// Primality of N (any size)
    IsPrime { n: String },

    /// All primes up to LIMIT
    Primes {
        limit: String,

        /// Print every prime instead of a preview
        #[arg(long)]
        show: bool,
    },

    /// Multiply two matrices stored as text (rows on lines or split by ';')
    Matrix { a: PathBuf, b: PathBuf },

    /// Word frequencies of a UTF-8 text file
    Words {
        file: PathBuf,

        /// Number of most frequent words to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Sort a comma/whitespace separated list of numbers
    Sort {
        /// File holding the list
        #[arg(required_unless_present = "inline")]
        file: Option<PathBuf>,

        /// The list itself, instead of a file
        #[arg(long, conflicts_with = "file")]
        inline: Option<String>,

        /// Write ascending and descending lists here, one per line
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an image to grayscale and save it as PNG
    Grayscale {
        input: PathBuf,
        output: PathBuf,

        /// Use Rec. 601 luma instead of the plain channel average
        #[arg(long)]
        luma: bool,
    },
}

/// What a command produced, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub fields: Vec<(String, String)>,
    pub lines: Vec<String>,
    pub elapsed: Duration,
}

impl Report {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            fields: Vec::new(),
            lines: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    fn field(mut self, key: &str, value: impl ToString) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

pub fn run(command: Command, limits: &Limits) -> anyhow::Result<Report> {
    let started = Instant::now();
    let mut report = match command {
        Command::Factorial { n } => {
            let outcome = compute(Operation::Factorial { n: NumericInput::new(n) }, limits)?;
            let Outcome::Factorial(result) = outcome else { bail!("unexpected outcome") };
            Report::new("Factorial")
                .field("n", result.n)
                .field("digits", result.digits)
                .field("value", result.value)
        }
        Command::Fibonacci { n, show_terms } => {
            let outcome = compute(Operation::Fibonacci { n: NumericInput::new(n) }, limits)?;
            let Outcome::Fibonacci(series) = outcome else { bail!("unexpected outcome") };
            let terms: Vec<String> = series.terms.iter().map(ToString::to_string).collect();
            Report::new("Fibonacci")
                .field("position", series.position())
                .field("nth", &series.nth)
                .line(preview(&terms, show_terms))
        }
        Command::IsPrime { n } => {
            let outcome = compute(Operation::IsPrime { n: NumericInput::new(n) }, limits)?;
            let Outcome::PrimeCheck(check) = outcome else { bail!("unexpected outcome") };
            let verdict = if check.is_prime { "prime" } else { "not prime" };
            Report::new("Primality").field("n", check.n).field("verdict", verdict)
        }
        Command::Primes { limit, show } => {
            let outcome = compute(Operation::PrimesUpTo { limit: NumericInput::new(limit) }, limits)?;
            let Outcome::Primes(listing) = outcome else { bail!("unexpected outcome") };
            let primes: Vec<String> = listing.primes.iter().map(ToString::to_string).collect();
            Report::new("Primes")
                .field("limit", listing.limit)
                .field("count", listing.count)
                .line(preview(&primes, show))
        }
        Command::Matrix { a, b } => {
            let matrix_a = read_matrix(&a)?;
            let matrix_b = read_matrix(&b)?;
            let outcome = compute(Operation::MatrixMultiply { matrix_a, matrix_b }, limits)?;
            let Outcome::Matrix(product) = outcome else { bail!("unexpected outcome") };
            let rows = product.matrix.iter().map(|row| join(row, " "));
            let mut report = Report::new("Matrix product")
                .field("shape", format!("{}x{}", product.rows, product.cols));
            report.lines.extend(rows);
            report
        }
        Command::Words { file, top } => {
            let text = read_text(&file)?;
            let outcome = compute(Operation::WordFrequency { text }, limits)?;
            let Outcome::WordFrequency(table) = outcome else { bail!("unexpected outcome") };
            let mut report = Report::new("Word frequency")
                .field("total", table.total_tokens())
                .field("distinct", table.distinct_tokens());
            report.lines.extend(
                table
                    .ranked()
                    .into_iter()
                    .take(top)
                    .map(|(token, count)| format!("{:>8}  {}", count, token)),
            );
            report
        }
        Command::Sort { file, inline, output } => {
            let text = match (file, inline) {
                (_, Some(text)) => text,
                (Some(path), None) => read_text(&path)?,
                (None, None) => bail!("either a file or --inline is required"),
            };
            let outcome = compute(Operation::Sort { numbers: NumberListInput::Text(text) }, limits)?;
            let Outcome::Sorted(sorted) = outcome else { bail!("unexpected outcome") };
            let ascending: Vec<String> = sorted.ascending.iter().map(ToString::to_string).collect();
            let descending: Vec<String> = sorted.descending.iter().map(ToString::to_string).collect();
            let mut report = Report::new("Sort").field("count", sorted.len());
            match output {
                Some(path) => {
                    let contents = format!("{}\n{}\n", ascending.join(","), descending.join(","));
                    std::fs::write(&path, contents)
                        .with_context(|| format!("writing {}", path.display()))?;
                    report = report.field("written", path.display());
                }
                None => {
                    report = report
                        .line(format!("ascending:  {}", preview(&ascending, false)))
                        .line(format!("descending: {}", preview(&descending, false)));
                }
            }
            report
        }
        Command::Grayscale { input, output, luma } => {
            let image = image::open(&input).with_context(|| format!("decoding {}", input.display()))?;
            let source = PixelBuffer::from_dynamic_image(&image);
            let method = if luma { GrayscaleMethod::Luma } else { GrayscaleMethod::Average };
            let operation = Operation::Grayscale {
                width: source.width(),
                height: source.height(),
                channels: u32::from(source.channels()),
                pixel_buffer: source.into_bytes(),
                method,
            };
            let outcome = compute(operation, limits)?;
            let Outcome::Grayscale(gray) = outcome else { bail!("unexpected outcome") };
            gray.save_png(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            Report::new("Grayscale")
                .field("size", format!("{}x{}", gray.width(), gray.height()))
                .field("channels", gray.channels())
                .field("method", format!("{:?}", method).to_lowercase())
                .field("written", output.display())
        }
    };
    report.elapsed = started.elapsed();
    Ok(report)
}

fn compute(operation: Operation, limits: &Limits) -> anyhow::Result<Outcome> {
    limits.admit(&operation)?;
    let name = operation.name();
    execute(operation).with_context(|| format!("{} failed", name))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_matrix(path: &Path) -> anyhow::Result<Vec<Vec<Scalar>>> {
    let text = read_text(path)?;
    parse_matrix_text(&text).with_context(|| format!("parsing matrix in {}", path.display()))
}

fn join<T: ToString>(values: &[T], separator: &str) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(separator)
}

/// Joins `values`, eliding the middle of long lists unless `full` is set.
fn preview(values: &[String], full: bool) -> String {
    if full || values.len() <= PREVIEW_LEN * 2 {
        return values.join(", ");
    }
    format!(
        "{}, ... ({} more) ..., {}",
        values[..PREVIEW_LEN].join(", "),
        values.len() - PREVIEW_LEN * 2,
        values[values.len() - PREVIEW_LEN..].join(", ")
    )
}
