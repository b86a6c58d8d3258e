use super::super::args::*;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Judge(args) => super::judge::run(args).await,
        Command::Aggregate(args) => super::aggregate::run(args).await,
    }
}
