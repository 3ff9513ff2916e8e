//! Source formatters used by the post-processing sweep.
//!
//! A formatter turns the full text of one generated file into its formatted text,
//! or fails for that file alone. Implementations must be idempotent: formatting an
//! already formatted file returns it unchanged.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::FormatError;

pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Built-in whitespace and import normalizer.
///
/// Rejects sources whose brackets do not balance, since those are broken
/// template output rather than something worth reformatting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TidyFormatter;

impl SourceFormatter for TidyFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        check_balanced(source)?;
        Ok(tidy(source))
    }
}

fn tidy(source: &str) -> String {
    let normalized = source.replace("\r\n", "\n");
    let mut lines: Vec<&str> = Vec::new();
    let mut imports: Vec<&str> = Vec::new();

    for line in normalized.split('\n').map(str::trim_end) {
        if line.starts_with("import ") {
            imports.push(line);
            continue;
        }
        flush_imports(&mut imports, &mut lines);
        let blank = line.is_empty();
        let previous_blank = lines.last().is_none_or(|l| l.is_empty());
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
    }
    flush_imports(&mut imports, &mut lines);

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn flush_imports<'a>(imports: &mut Vec<&'a str>, lines: &mut Vec<&'a str>) {
    if imports.is_empty() {
        return;
    }
    imports.sort_unstable();
    imports.dedup();
    lines.append(imports);
}

fn check_balanced(source: &str) -> Result<(), FormatError> {
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        Char,
    }

    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut state = State::Code;
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match state {
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
            State::Str | State::Char => {
                let closing = if matches!(state, State::Str) { '"' } else { '\'' };
                if c == '\\' {
                    if chars.next() == Some('\n') {
                        line += 1;
                    }
                } else if c == closing || c == '\n' {
                    state = State::Code;
                }
            }
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => state = State::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                '"' => state = State::Str,
                '\'' => state = State::Char,
                '{' | '(' | '[' => stack.push((c, line)),
                '}' | ')' | ']' => {
                    let opener = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == opener => {}
                        _ => return Err(FormatError::Unbalanced { delimiter: c, line }),
                    }
                }
                _ => {}
            },
        }
    }

    match stack.pop() {
        Some((delimiter, line)) => Err(FormatError::Unbalanced { delimiter, line }),
        None => Ok(()),
    }
}

/// Pipes the source through an external program (`google-java-format -`, ...).
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argument vector; `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl SourceFormatter for CommandFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Feed stdin from a separate thread so a chatty child cannot block on a full stdout pipe.
        let stdin = child.stdin.take();
        let input = source.to_string();
        let writer = std::thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        });

        let output = child.wait_with_output().map_err(spawn_error)?;
        match writer.join() {
            Ok(result) => result.map_err(spawn_error)?,
            Err(_) => {
                return Err(FormatError::Failed {
                    program: self.program.clone(),
                    status: "stdin writer panicked".to_string(),
                    stderr: String::new(),
                });
            }
        }

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput)
    }
}
