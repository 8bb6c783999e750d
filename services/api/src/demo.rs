use crate::infra::load_context;
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use healthbridge::assessment::{
    compute_on, message_for, waiting_period_days_for, Answer, AnswersPatch, AssessmentContext,
    AssessmentResults, CoverageOutlook, FlowTransition, ImmigrationStatus, InMemoryStorage,
    RamqApplication, Session, STANDARD_WAITING_PERIOD_DAYS,
};
use healthbridge::error::AppError;
use std::num::NonZeroU8;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AgreementArgs {
    /// Country of origin, exactly as listed (e.g. "France")
    pub(crate) country: String,
}

#[derive(Args, Debug)]
pub(crate) struct WaitingPeriodArgs {
    /// Arrival or RAMQ application date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) reference_date: String,
    /// Waiting period in days. Derived from --country when omitted.
    #[arg(long)]
    pub(crate) days: Option<u32>,
    /// Country of origin used to look up a waiver
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// Immigration status; takes the waiting period from the province rules
    #[arg(long)]
    pub(crate) status: Option<ImmigrationStatus>,
    /// Province whose rules apply with --status (defaults to the configured province)
    #[arg(long, requires = "status")]
    pub(crate) province: Option<String>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the scripted sessions (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Province whose rules apply (defaults to the configured province)
    #[arg(long)]
    pub(crate) province: Option<String>,
}

pub(crate) fn run_agreement(args: AgreementArgs) -> Result<(), AppError> {
    let context = load_context(None)?;
    let status = context.agreements.status(&args.country);

    let Some(agreement) = status.agreement.as_ref() else {
        println!("No country given; nothing to classify.");
        return Ok(());
    };

    let message = message_for(Some(agreement), &args.country);
    println!("{} ({})", args.country, agreement.category.label());
    println!("- [{}] {}", message.severity.label(), message.text);
    println!(
        "- Waiting period: {} days",
        waiting_period_days_for(agreement)
    );
    if !agreement.notes.is_empty() {
        println!("- Notes: {}", agreement.notes);
    }
    if !agreement.documents_required.is_empty() {
        println!("- Documents required:");
        for document in &agreement.documents_required {
            println!("  - {document}");
        }
    }

    Ok(())
}

pub(crate) fn run_waiting_period(args: WaitingPeriodArgs) -> Result<(), AppError> {
    let WaitingPeriodArgs {
        reference_date,
        days,
        country,
        status,
        province,
        today,
    } = args;

    let days = match (days, status, country) {
        (Some(days), _, _) => days,
        (None, Some(status), country) => {
            let context = load_context(province)?;
            let agreement = country
                .as_deref()
                .map(|country| context.agreements.classify(country));
            let rules = context.province.as_ref();
            match rules.waiting_period_days(status, agreement.as_ref()) {
                Some(days) => days,
                None => {
                    println!(
                        "{}: not covered by {} ({})",
                        status.label(),
                        rules.health_plan_name,
                        rules.eligibility_for(status).notes
                    );
                    return Ok(());
                }
            }
        }
        (None, None, Some(country)) => {
            let context = load_context(None)?;
            waiting_period_days_for(&context.agreements.classify(&country))
        }
        (None, None, None) => STANDARD_WAITING_PERIOD_DAYS,
    };
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let timeline = compute_on(&reference_date, days, today)?;

    println!(
        "Reference date {} + {} days",
        timeline.reference_date, days
    );
    println!("- Coverage starts: {}", timeline.coverage_start_date);
    if timeline.is_eligible_now {
        println!("- Eligible now (as of {today})");
    } else {
        println!(
            "- {} days remaining (as of {today})",
            timeline.days_remaining
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, province } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let context = load_context(province)?;

    println!(
        "HealthBridge assessment demo ({} / {}, {today})",
        context.province.name, context.province.health_plan_name
    );

    println!("\nSession 1: permanent resident from France");
    render_results(bilateral_session(&context, today)?.as_ref());

    println!("\nSession 2: permanent resident from Brazil, RAMQ application sent 30 days ago");
    render_results(permanent_resident_session(&context, today)?.as_ref());

    println!("\nSession 3: work permit holder from Mexico with employer benefits");
    render_results(work_permit_session(&context, today)?.as_ref());

    Ok(())
}

fn open_session(context: &AssessmentContext) -> Result<Session<InMemoryStorage>, AppError> {
    let storage = Arc::new(InMemoryStorage::default());
    Ok(Session::new(context.clone(), storage)?)
}

fn finish(
    session: &Session<InMemoryStorage>,
    today: NaiveDate,
) -> Result<Option<AssessmentResults>, AppError> {
    Ok(session.load_results_on(today)?)
}

fn choose_status_and_country(
    session: &mut Session<InMemoryStorage>,
    status: ImmigrationStatus,
    country: &str,
) -> Result<FlowTransition, AppError> {
    let flow = session.flow_mut();
    flow.update(AnswersPatch::status(status))?;
    flow.next_step()?;
    let transition = flow.update(AnswersPatch::country(country))?;
    println!("- {} from {country}: {transition:?}", status.label());
    Ok(transition)
}

fn bilateral_session(
    context: &AssessmentContext,
    today: NaiveDate,
) -> Result<Option<AssessmentResults>, AppError> {
    let mut session = open_session(context)?;
    choose_status_and_country(&mut session, ImmigrationStatus::PermanentResident, "France")?;
    finish(&session, today)
}

fn permanent_resident_session(
    context: &AssessmentContext,
    today: NaiveDate,
) -> Result<Option<AssessmentResults>, AppError> {
    let mut session = open_session(context)?;
    choose_status_and_country(&mut session, ImmigrationStatus::PermanentResident, "Brazil")?;

    let submitted_on = today.checked_sub_days(Days::new(30)).unwrap_or(today);
    let arrived_on = today.checked_sub_days(Days::new(35)).unwrap_or(today);
    let flow = session.flow_mut();
    let steps = [
        AnswersPatch {
            arrival_date: Some(arrived_on.format("%Y-%m-%d").to_string()),
            ramq_application_submitted: Some(RamqApplication::Yes),
            ramq_submission_date: Some(submitted_on.format("%Y-%m-%d").to_string()),
            insurance_within_5_days: Some(Answer::No),
            ..AnswersPatch::default()
        },
        AnswersPatch {
            family_size: NonZeroU8::new(2),
            include_prescription: Some(true),
            ..AnswersPatch::default()
        },
    ];
    for patch in steps {
        flow.update(patch)?;
        let transition = flow.next_step()?;
        println!("- {transition:?}");
    }

    finish(&session, today)
}

fn work_permit_session(
    context: &AssessmentContext,
    today: NaiveDate,
) -> Result<Option<AssessmentResults>, AppError> {
    let mut session = open_session(context)?;
    choose_status_and_country(&mut session, ImmigrationStatus::WorkPermit, "Mexico")?;

    let flow = session.flow_mut();
    flow.update(AnswersPatch {
        employer_benefits: Some(Answer::Yes),
        ..AnswersPatch::default()
    })?;
    let transition = flow.next_step()?;
    println!("- {transition:?}");

    finish(&session, today)
}

fn render_results(results: Option<&AssessmentResults>) {
    let Some(results) = results else {
        println!("  No stored assessment; the wizard has to be completed first.");
        return;
    };

    println!(
        "  [{}] {}",
        results.agreement_message.severity.label(),
        results.agreement_message.text
    );

    match &results.outlook {
        CoverageOutlook::Immediate => {
            println!("  {} coverage: no waiting period", results.health_plan_name)
        }
        CoverageOutlook::Waiting { timeline } if timeline.is_eligible_now => println!(
            "  {} coverage active since {}",
            results.health_plan_name, timeline.coverage_start_date
        ),
        CoverageOutlook::Waiting { timeline } => println!(
            "  {} coverage starts {} ({} days remaining)",
            results.health_plan_name, timeline.coverage_start_date, timeline.days_remaining
        ),
        CoverageOutlook::AwaitingArrival { days } => println!(
            "  {} coverage starts {days} days after arrival; enter an arrival date for the exact day",
            results.health_plan_name
        ),
        CoverageOutlook::NotEligible { notes } => println!(
            "  Not eligible for {}: {notes}",
            results.health_plan_name
        ),
    }

    if results.interim_options.is_empty() {
        return;
    }

    println!(
        "  Interim insurance for a household of {}:",
        results.snapshot.family_size()
    );
    for priced in &results.interim_options {
        let marker = if results.recommended_option.as_ref() == Some(priced) {
            " (recommended)"
        } else {
            ""
        };
        println!(
            "  - {} ${}/month{marker}",
            priced.provider.name, priced.monthly_price
        );
    }
}
