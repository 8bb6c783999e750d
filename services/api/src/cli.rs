use crate::demo::{
    run_agreement, run_demo, run_waiting_period, AgreementArgs, DemoArgs, WaitingPeriodArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use healthbridge::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HealthBridge",
    about = "Check public health coverage eligibility and waiting periods for newcomers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Look up the bilateral agreement for a country of origin
    Agreement(AgreementArgs),
    /// Compute when public coverage starts from a reference date
    WaitingPeriod(WaitingPeriodArgs),
    /// Run scripted assessment sessions end to end
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured province rules
    #[arg(long)]
    pub(crate) province: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Agreement(args) => run_agreement(args),
        Command::WaitingPeriod(args) => run_waiting_period(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use healthbridge::assessment::ImmigrationStatus;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn waiting_period_arguments_parse() {
        let cli = Cli::try_parse_from([
            "healthbridge-api",
            "waiting-period",
            "--reference-date",
            "2025-01-01",
            "--days",
            "90",
            "--today",
            "2025-02-01",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::WaitingPeriod(args)) => {
                assert_eq!(args.reference_date, "2025-01-01");
                assert_eq!(args.days, Some(90));
                assert!(args.today.is_some());
            }
            other => panic!("expected waiting-period command, got {other:?}"),
        }
    }

    #[test]
    fn status_aliases_parse_for_waiting_period() {
        for (raw, expected) in [
            ("pr", ImmigrationStatus::PermanentResident),
            ("student", ImmigrationStatus::StudyPermit),
            ("Work_Permit", ImmigrationStatus::WorkPermit),
        ] {
            let cli = Cli::try_parse_from([
                "healthbridge-api",
                "waiting-period",
                "--reference-date",
                "2025-01-01",
                "--status",
                raw,
                "--province",
                "british_columbia",
            ])
            .expect("arguments parse");

            match cli.command {
                Some(Command::WaitingPeriod(args)) => {
                    assert_eq!(args.status, Some(expected));
                    assert_eq!(args.province.as_deref(), Some("british_columbia"));
                }
                other => panic!("expected waiting-period command, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_status_and_orphan_province_are_rejected() {
        assert!(Cli::try_parse_from([
            "healthbridge-api",
            "waiting-period",
            "--reference-date",
            "2025-01-01",
            "--status",
            "tourist",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "healthbridge-api",
            "waiting-period",
            "--reference-date",
            "2025-01-01",
            "--province",
            "alberta",
        ])
        .is_err());
    }

    #[test]
    fn agreement_takes_only_a_country() {
        assert!(Cli::try_parse_from(["healthbridge-api", "agreement", "France"]).is_ok());
        assert!(Cli::try_parse_from([
            "healthbridge-api",
            "agreement",
            "France",
            "--province",
            "ontario",
        ])
        .is_err());
    }

    #[test]
    fn malformed_today_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "healthbridge-api",
            "waiting-period",
            "--reference-date",
            "2025-01-01",
            "--today",
            "01/02/2025",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["healthbridge-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
