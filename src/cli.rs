use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"
{about}

{usage-heading} {usage}

{all-args}

{after-help}"#;

#[derive(Parser, Debug)]
#[command(name = "axal")]
#[command(author, version)]
#[command(about = "Add entry/exit trace statements to every C# method under a directory")]
#[command(after_help = "Every method body gets a line printed on entry and before each exit:
  AXAL_ENTER <Namespace.Type> <Method> <yyyy-MM-dd HH:mm:ss.ffffff>
  AXAL_EXIT  <Namespace.Type> <Method> <yyyy-MM-dd HH:mm:ss.ffffff>

Files are rewritten in place. Files with syntax errors are reported and left untouched.

Environment:
  AXAL_CONFIG   Path to a config.toml overriding the defaults
  AXAL_LOG      Log filter for diagnostics on stderr (e.g. axal=debug)")]
#[command(help_template = HELP_TEMPLATE)]
pub struct Cli {
    /// Directory scanned recursively for .cs files
    pub directory: PathBuf,
}

#[derive(Parser, Debug)]
#[command(name = "axal-index")]
#[command(author, version)]
#[command(about = "Map every C# type declared under a directory to the file that declares it")]
#[command(after_help = "Writes class_mapping.json into DIRECTORY:
  { \"Namespace.Outer.Inner\": \"/absolute/path/File.cs\", ... }")]
#[command(help_template = HELP_TEMPLATE)]
pub struct IndexCli {
    /// Directory scanned recursively for .cs files
    pub directory: PathBuf,
}
