use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::tasks::Task;

#[derive(Parser, Debug)]
#[command(
    name = "docmine",
    version,
    about = "Extract PDF text and tables into SQLite and run NLP passes over them",
    after_help = "Flags can be combined; each one queues a task. Tasks run on a small \
                  worker pool, so a pass over a file may start before that file's \
                  extraction has finished. Use --workers 1 to run them strictly in order.",
    group(
        ArgGroup::new("tasks")
            .required(true)
            .multiple(true)
            .args(["extract", "tables", "nlp", "entities", "topic", "embed", "cluster", "command"])
    )
)]
pub struct Cli {
    /// Extract the text of a PDF into chunks
    #[arg(short = 'e', long, value_name = "PDF")]
    pub extract: Option<PathBuf>,

    /// Extract the tables of a PDF (also written as TSV side files)
    #[arg(long, value_name = "PDF")]
    pub tables: Option<PathBuf>,

    /// Lemmatize and clean the stored chunks of a file
    #[arg(short = 'n', long, value_name = "FILE")]
    pub nlp: Option<String>,

    /// Recognize entities in the processed text of a file
    #[arg(long, value_name = "FILE")]
    pub entities: Option<String>,

    /// Fit a topic model to the processed text of a file
    #[arg(short = 't', long, value_name = "FILE")]
    pub topic: Option<String>,

    /// Embed the processed text of a file
    #[arg(long, value_name = "FILE")]
    pub embed: Option<String>,

    /// Cluster the embeddings of a file
    #[arg(long, value_name = "FILE")]
    pub cluster: Option<String>,

    /// Administrative command
    #[arg(short = 'c', long, value_enum)]
    pub command: Option<AdminCommand>,

    /// Database file (default: ./text_data.db)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Worker threads (default: from docmine.toml, else 2)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AdminCommand {
    /// Create the database and apply migrations
    #[value(name = "initDB")]
    InitDb,
}

impl Cli {
    /// Tasks requested on the command line, in queue order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks = Vec::new();
        if let Some(path) = &self.extract {
            tasks.push(Task::ProcessPdf(path.clone()));
        }
        if let Some(path) = &self.tables {
            tasks.push(Task::ExtractTables(path.clone()));
        }
        if let Some(name) = &self.nlp {
            tasks.push(Task::ApplyNlp(name.clone()));
        }
        if let Some(name) = &self.entities {
            tasks.push(Task::ExtractEntities(name.clone()));
        }
        if let Some(name) = &self.topic {
            tasks.push(Task::GenerateTopics(name.clone()));
        }
        if let Some(name) = &self.embed {
            tasks.push(Task::GenerateEmbeddings(name.clone()));
        }
        if let Some(name) = &self.cluster {
            tasks.push(Task::ClusterEmbeddings(name.clone()));
        }
        if let Some(AdminCommand::InitDb) = self.command {
            tasks.push(Task::InitDb);
        }
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("docmine").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_queue_in_fixed_order() {
        let cli = parse(&["-c", "initDB", "-t", "a.pdf", "-n", "a.pdf", "-e", "a.pdf"]);
        let names: Vec<&str> = cli.tasks().iter().map(Task::name).collect();
        assert_eq!(names, vec!["process_pdf", "apply_nlp", "generate_topics", "initDB"]);
    }

    #[test]
    fn long_flags_and_overrides() {
        let cli = parse(&[
            "--tables", "t.pdf", "--entities", "t.pdf", "--embed", "t.pdf", "--cluster", "t.pdf",
            "--db", "other.db", "--workers", "4", "-v",
        ]);
        assert_eq!(cli.tasks().len(), 4);
        assert_eq!(cli.tasks()[0], Task::ExtractTables(PathBuf::from("t.pdf")));
        assert_eq!(cli.db, Some(PathBuf::from("other.db")));
        assert_eq!(cli.workers, Some(4));
        assert!(cli.verbose);
    }

    #[test]
    fn at_least_one_task_is_required() {
        assert!(Cli::try_parse_from(["docmine"]).is_err());
        assert!(Cli::try_parse_from(["docmine", "--workers", "2"]).is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["docmine", "-c", "dropDB"]).is_err());
    }
}
