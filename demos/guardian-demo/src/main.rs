//! Walk one viewer through the HALO age gate and print what they can see
//!
//! Usage: guardian-demo [date-of-birth | birth-year] [config.json]

use chrono::{DateTime, Utc};
use tracing::info;

use halo_core::{
    ContentId, ContentItem, GuardianConfig, HaloError, HaloResult, Viewer, ViewerAccount, ViewerId,
};
use halo_guardian::{parse_birth_year, parse_date_of_birth, AccessPolicy, AgeGateNotice};
use halo_safety::{
    moderated_feed, BlockList, ChatFilter, Moderation, ModerationSink, ReportTarget, TracingSink,
};
use halo_session::SharedSession;

fn catalog() -> Vec<ContentItem> {
    vec![
        ContentItem::new(ContentId::new(1), "Sunrise Skate Session")
            .with_creator(ViewerId::new(11))
            .live(),
        ContentItem::new(ContentId::new(2), "Late Night Lounge")
            .restricted()
            .with_creator(ViewerId::new(12))
            .live(),
        ContentItem::new(ContentId::new(3), "Whiskey Tasting")
            .with_minimum_age(21)
            .with_creator(ViewerId::new(13)),
        ContentItem::new(ContentId::new(4), "City Walk Replay").with_creator(ViewerId::new(12)),
    ]
}

fn print_feed(label: &str, session: &SharedSession, policy: &AccessPolicy, blocks: &BlockList) {
    let viewer = session.snapshot();
    let feed = moderated_feed(policy, &catalog(), viewer.as_ref(), Some(blocks));
    let titles: Vec<&str> = feed.iter().map(|c| c.title.as_str()).collect();
    println!("[{:<15}] {:<28} -> {:?}", session.state(), label, titles);
}

fn print_notice(notice: &AgeGateNotice) {
    println!("  {}: {}", notice.title, notice.body);
}

/// Block creator 12 and report stream 3. Switched-off features are skipped.
fn moderate<S: ModerationSink>(
    moderation: &Moderation<S>,
    viewer: Option<&Viewer>,
    blocks: &mut BlockList,
    now: DateTime<Utc>,
) -> HaloResult<Vec<String>> {
    let mut lines = Vec::new();

    match moderation.block(viewer, ViewerId::new(12), now) {
        Ok(request) => {
            blocks.apply(&request)?;
            lines.push("blocked creator 12".to_string());
        }
        Err(e @ HaloError::FeatureDisabled(_)) => lines.push(format!("block skipped: {}", e)),
        Err(e) => return Err(e),
    }

    match moderation.report(
        viewer,
        ReportTarget::Stream(ContentId::new(3)),
        "misleading title",
        now,
    ) {
        Ok(_) => lines.push("reported stream 3".to_string()),
        Err(e @ HaloError::FeatureDisabled(_)) => lines.push(format!("report skipped: {}", e)),
        Err(e) => return Err(e),
    }

    Ok(lines)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let config = match args.get(2) {
        Some(path) => GuardianConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => GuardianConfig::default(),
    };

    let entry = args.get(1).map(String::as_str).unwrap_or("1994-07-21");
    let date_of_birth = if entry.trim().len() == 4 {
        parse_birth_year(entry)
    } else {
        parse_date_of_birth(entry)
    };

    let now: DateTime<Utc> = Utc::now();
    let today = now.date_naive();
    let min_age = config.adult_mode.min_age;
    let policy = AccessPolicy::from_config(&config.adult_mode);
    let session = SharedSession::new(config.adult_mode.clone());
    let me = ViewerId::new(7);
    let mut blocks = BlockList::new(me);

    info!(min_age, "guardian demo starting");
    print_feed("signed out", &session, &policy, &blocks);

    session.login(ViewerAccount::new(me, "demo", "demo@example.com"));
    print_feed("signed in", &session, &policy, &blocks);

    if let Err(e) = session.toggle_elevated_mode() {
        println!("  toggle refused: {}", e);
    }

    let date_of_birth = match date_of_birth {
        Ok(dob) => dob,
        Err(e) => {
            print_notice(&AgeGateNotice::for_error(&e, min_age));
            return Ok(());
        }
    };

    match session.verify_age(date_of_birth, today) {
        Ok(result) if result.verified => {
            println!("  verified, age {}", result.age);
        }
        Ok(_) => {
            print_notice(&AgeGateNotice::age_requirement_not_met(min_age));
            print_feed("verification failed", &session, &policy, &blocks);
            return Ok(());
        }
        Err(e) => {
            print_notice(&AgeGateNotice::for_error(&e, min_age));
            return Ok(());
        }
    }
    print_feed("verified", &session, &policy, &blocks);

    session.enable_elevated_mode()?;
    print_feed("elevated mode on", &session, &policy, &blocks);

    let moderation = Moderation::new(config.safety.clone(), TracingSink);
    let viewer = session.snapshot();
    for line in moderate(&moderation, viewer.as_ref(), &mut blocks, now)? {
        println!("  {}", line);
    }
    print_feed("after moderation", &session, &policy, &blocks);

    let chat = ChatFilter::new(["spam", "scam"], &config.safety)?;
    println!("  chat: {}", chat.prepare("  great stream, not a scam at all  ")?);

    session.disable_elevated_mode();
    print_feed("elevated mode off", &session, &policy, &blocks);

    session.logout();
    print_feed("signed out", &session, &policy, &blocks);

    Ok(())
}
