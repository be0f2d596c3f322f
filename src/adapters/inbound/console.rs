use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;

use crate::{domain::models::OrphanSet, ports::prompt::ConfirmationPrompt};

/// Whether an answer to the prompt means yes
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

struct Console<R, W> {
    reader: R,
    writer: W,
}

/// Asks the operator on a terminal before anything is deleted.
///
/// Lists every orphan, then reads one line; only `y` or `yes` (any case)
/// confirms. End of input counts as a refusal.
pub struct ConsolePrompt<R, W> {
    console: Mutex<Console<R, W>>,
}

impl ConsolePrompt<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsolePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            console: Mutex::new(Console { reader, writer }),
        }
    }

    /// Give back the writer, e.g. to inspect what was printed
    pub fn into_writer(self) -> W {
        self.console.into_inner().writer
    }
}

#[async_trait]
impl<R, W> ConfirmationPrompt for ConsolePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, orphans: &OrphanSet) -> std::io::Result<bool> {
        let mut console = self.console.lock().await;

        let mut text = format!(
            "The following {} bucket(s) are not declared by any active stack:\n",
            orphans.len()
        );
        for bucket in orphans {
            text.push_str(&format!("  {}\n", bucket));
        }
        text.push_str("Delete them and ALL their contents, including every version? (y/N) ");

        console.writer.write_all(text.as_bytes()).await?;
        console.writer.flush().await?;

        let mut answer = String::new();
        let read = console.reader.read_line(&mut answer).await?;
        Ok(read > 0 && is_affirmative(&answer))
    }
}

/// Confirms without asking, for `--yes` runs
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl ConfirmationPrompt for AssumeYes {
    async fn confirm(&self, _orphans: &OrphanSet) -> std::io::Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::BucketName;

    fn orphans(names: &[&str]) -> OrphanSet {
        names.iter().map(|n| BucketName::new(*n).unwrap()).collect()
    }

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "Y", "yes", "YES", " yes\n", "Yes\r\n"] {
            assert!(is_affirmative(answer), "{answer:?} should confirm");
        }
        for answer in ["", "n", "no", "yep", "y e s", "sure"] {
            assert!(!is_affirmative(answer), "{answer:?} should decline");
        }
    }

    #[tokio::test]
    async fn test_prompt_lists_orphans_and_reads_answer() {
        let prompt = ConsolePrompt::new(&b"yes\n"[..], Vec::new());
        let confirmed = prompt.confirm(&orphans(&["b-bucket", "a-bucket"])).await.unwrap();
        assert!(confirmed);

        let printed = String::from_utf8(prompt.into_writer()).unwrap();
        assert!(printed.contains("2 bucket(s)"));
        let a = printed.find("a-bucket").unwrap();
        let b = printed.find("b-bucket").unwrap();
        assert!(a < b);
        assert!(printed.ends_with("(y/N) "));
    }

    #[tokio::test]
    async fn test_end_of_input_declines() {
        let prompt = ConsolePrompt::new(&b""[..], Vec::new());
        assert!(!prompt.confirm(&orphans(&["a"])).await.unwrap());
    }

    #[tokio::test]
    async fn test_assume_yes_always_confirms() {
        assert!(AssumeYes.confirm(&orphans(&["a"])).await.unwrap());
    }
}
