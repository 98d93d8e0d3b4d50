use lapse::command_argument_builder;
use lapse::handlers::handle_hunt;
use lapse_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("hunt", primary_command)) => {
            let code = handle_hunt(primary_command, quiet).await;
            std::process::exit(code);
        }
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
