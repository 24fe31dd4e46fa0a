//! Command-line argument parsing and help for fiander.
//!
//! This module handles all CLI flags used for config initialization and help.
//!
//! When invoked with no args/flags, fiander simply launches the TUI in the current directory.

use crate::config::Config;

#[derive(Debug, PartialEq, Eq)]
pub enum CliAction {
    RunApp,
    RunAppAtPath(String),
    Exit,
}

pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args(&args)
}

/// Maps the arguments (program name excluded) to an action, running the informational flags.
pub fn parse_args(args: &[String]) -> CliAction {
    let Some(first) = args.first() else {
        return CliAction::RunApp;
    };

    if args.len() > 1 {
        eprintln!("Error: fiander accepts only one argument at a time.");
        eprintln!("Usage: fiander [PATH] or fiander [OPTION]");
        return CliAction::Exit;
    }

    match first.as_str() {
        "--version" | "-v" => {
            print_version();
            CliAction::Exit
        }
        "-h" | "--help" => {
            print_help();
            CliAction::Exit
        }
        "--keybinds" | "--keys" => {
            print_keybinds();
            CliAction::Exit
        }
        "--init" => {
            if let Err(e) = Config::generate_default(&Config::default_path()) {
                eprintln!("Error: {}", e);
            }
            CliAction::Exit
        }
        arg if !arg.starts_with('-') && !arg.trim().is_empty() => {
            CliAction::RunAppAtPath(arg.to_string())
        }
        arg => {
            eprintln!("Unknown argument: {}", arg);
            eprintln!("Try --help for available options");
            CliAction::Exit
        }
    }
}

fn print_version() {
    println!("fiander {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"fiander - a two-pane terminal file browser with vim-style keys

USAGE:
  fiander [PATH]

PATH:
  Directory to open (defaults to current directory)

OPTIONS:
      --init              Generate the default configuration file
      --keybinds          Display all the default keybinds
  -h, --help              Print help information
  -v, --version           Display the current installed version of fiander

ENVIRONMENT:
  FIANDER_CONFIG          Override the default config path
  FIANDER_LOG             Log filter, e.g. "debug" or "fiander=trace"
  EDITOR                  Editor used when [editor] cmd is unset
"#
    );
}

pub const KEYBINDS_TEXT: &str = r##"
=========================
 Key Bindings
=========================
[keys]
  go_up                     ["k", "Up"]
  go_down                   ["j", "Down"]
  go_parent                 ["h", "Left"]
  go_into_dir               ["l", "Right", "Enter"]   (files open in the editor)
  go_to_top                 ["gg", "Home"]
  go_to_bottom              ["G", "End"]
  half_page_up              ["Ctrl+u"]   (preview pane when focused)
  half_page_down            ["Ctrl+d"]
  page_up                   ["PageUp"]
  page_down                 ["PageDown"]
  back                      ["-", "Backspace"]
  toggle_hidden             ["."]
  cycle_sort                ["s"]
  reverse_sort              ["S"]
  reload                    ["Ctrl+r"]

  visual                    ["v", "V"]   (in the preview: mark lines, v again copies them)
  stage_copy                ["yy"]
  stage_cut                 ["dd"]   (nothing is removed until paste)
  stage_move                ["mm"]
  paste                     ["p"]
  purge                     ["D"]    (deletes a cut register after y/N)
  export                    ["X"]    (catlsr export of the directory under the cursor)
  clear_register            ["Ctrl+c"]
  toggle_output             ["o"]

  toggle_focus              ["Tab"]
  prompt                    [":"]
  keybind_help              ["?"]
  quit                      ["q"]

  Prompt commands:
    :catlsr  :cd <path>  :ls  :clear  :help  :q

  Syntax Reference:
    Modifiers: <c-x> (Ctrl), <m-x>/<a-x> (Alt/Meta), <s-x> (Shift)
    Standard:  ctrl+x, alt+x, shift+x
    Special:   "space", "Backspace", "Enter", "Esc", "Tab", "PageUp", "F1".."F12"
    Sequences: two characters, e.g. "dd" or "gg"
"##;

fn print_keybinds() {
    println!("{}", KEYBINDS_TEXT);
}
