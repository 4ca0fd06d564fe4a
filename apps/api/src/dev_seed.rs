use chrono::Utc;

use skillgraph_application::{
    ArticleRepository, DirectoryRepository, FlagRepository, JobBoardRepository, TemplateRepository,
    TicketRepository, TrackRepository,
};
use skillgraph_core::AppResult;
use skillgraph_domain::{
    Article, FeatureFlag, JobPosting, JobStatus, LearningTrack, ManagedUser, Template,
    TemplateKind, Ticket, TicketStatus, TrackStep,
};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Loads the demo data set used by local console development.
pub async fn run(
    directory: &dyn DirectoryRepository,
    job_board: &dyn JobBoardRepository,
    templates: &dyn TemplateRepository,
    content: &dyn ArticleRepository,
    support: &dyn TicketRepository,
    tracks: &dyn TrackRepository,
    flags: &dyn FlagRepository,
) -> AppResult<()> {
    let now = Utc::now().timestamp_millis();

    for (id, name, email, active) in [
        ("u1", "Ava Patel", "ava@example.com", true),
        ("u2", "Noah Kim", "noah@example.com", true),
        ("u3", "Mia Lopez", "mia@example.com", false),
        ("u4", "Liam Chen", "liam@example.com", true),
        ("u5", "Sophia Nguyen", "sophia@example.com", true),
        ("u6", "Ethan Brown", "ethan@example.com", false),
    ] {
        let mut user = ManagedUser::new(id, name, email)?;
        user.set_active(active);
        directory.insert_user(user).await?;
    }

    for (id, title, company, location, status) in [
        ("j1", "Frontend Engineer", "Acme", "Remote", JobStatus::Pending),
        ("j2", "Backend Engineer", "Globex", "NYC", JobStatus::Approved),
        ("j3", "Data Analyst", "Initech", "SF", JobStatus::Pending),
    ] {
        let mut job = JobPosting::new(id, title, company, location, now - DAY_MS)?;
        job.set_status(status);
        job_board.insert_job(job).await?;
    }

    templates
        .insert(Template::new(
            "t1",
            "Default SOFA",
            TemplateKind::Sofa,
            "{ \"score\": \"sum(weights)\" }",
            now - DAY_MS,
        )?)
        .await?;

    content
        .insert_article(Article::new(
            "a1",
            "Getting Started",
            "getting-started",
            "Welcome to SkillGraph…",
            now - HOUR_MS,
        )?)
        .await?;

    let mut login_issue = Ticket::new("tk2", "Login issue", "noah@example.com", now - 2 * HOUR_MS)?;
    login_issue.set_status(TicketStatus::Pending);
    support.insert_ticket(login_issue).await?;
    support
        .insert_ticket(Ticket::new(
            "tk1",
            "Unable to upload resume",
            "ava@example.com",
            now - HOUR_MS,
        )?)
        .await?;

    let mut frontend_basics = LearningTrack::new("lt1", "Frontend Basics")?;
    frontend_basics.add_step(TrackStep::new("s1", "Intro to TypeScript", None)?);
    frontend_basics.add_step(TrackStep::new("s2", "React Components", None)?);
    tracks.insert_track(frontend_basics).await?;

    flags
        .insert_flag(FeatureFlag::new(
            "jobs.enabled",
            true,
            Some("Enable Jobs moderation UI".to_owned()),
        )?)
        .await?;
    flags
        .insert_flag(FeatureFlag::new(
            "audit.enabled",
            true,
            Some("Enable audit log recording".to_owned()),
        )?)
        .await?;

    Ok(())
}
