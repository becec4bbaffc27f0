use chrono::Utc;
use tempfile::tempdir;
use tradepost_community::{CommunityError, TicketDesk, TicketKind, TicketStatus, TranscriptLine};
use tradepost_types::{ChannelId, GuildId, UserId};

fn line(author: &str, content: &str) -> TranscriptLine {
    TranscriptLine {
        author: UserId::new(author),
        sent_at: Utc::now(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn tickets_are_numbered_sequentially_per_guild() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");

    let first = desk
        .open_ticket(&guild, UserId::new("a"), TicketKind::ProductAdvice, "q", ChannelId::new(1))
        .await
        .unwrap();
    let second = desk
        .open_ticket(&guild, UserId::new("b"), TicketKind::IssueReport, "bug", ChannelId::new(2))
        .await
        .unwrap();
    assert_eq!(first.number, 1);
    assert_eq!(second.number, 2);

    // Another guild counts from one again.
    let elsewhere = desk
        .open_ticket(
            &GuildId::new("g2"),
            UserId::new("a"),
            TicketKind::PurchaseHelp,
            "help",
            ChannelId::new(3),
        )
        .await
        .unwrap();
    assert_eq!(elsewhere.number, 1);
}

#[tokio::test]
async fn one_open_ticket_per_user() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");

    desk.open_ticket(&guild, UserId::new("a"), TicketKind::ProductAdvice, "q", ChannelId::new(1))
        .await
        .unwrap();
    let err = desk
        .open_ticket(&guild, UserId::new("a"), TicketKind::IssueReport, "more", ChannelId::new(2))
        .await
        .unwrap_err();
    assert!(matches!(err, CommunityError::TicketAlreadyOpen));
}

#[tokio::test]
async fn closing_frees_the_user_for_a_new_ticket() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");
    let user = UserId::new("a");

    let first = desk
        .open_ticket(&guild, user.clone(), TicketKind::ProductAdvice, "q", ChannelId::new(1))
        .await
        .unwrap();
    desk.close_ticket(&guild, first.number).await.unwrap();

    // Numbers keep counting up, they are never reused.
    let second = desk
        .open_ticket(&guild, user, TicketKind::ProductAdvice, "q2", ChannelId::new(2))
        .await
        .unwrap();
    assert_eq!(second.number, 2);
}

#[tokio::test]
async fn transcript_accumulates_while_open() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");

    let ticket = desk
        .open_ticket(&guild, UserId::new("a"), TicketKind::IssueReport, "bug", ChannelId::new(1))
        .await
        .unwrap();
    desk.record_message(&guild, ticket.number, line("a", "it breaks"))
        .await
        .unwrap();
    desk.record_message(&guild, ticket.number, line("staff", "on it"))
        .await
        .unwrap();

    let closed = desk.close_ticket(&guild, ticket.number).await.unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    assert_eq!(closed.messages.len(), 2);
    assert_eq!(closed.messages[0].content, "it breaks");
    assert_eq!(closed.messages[1].author, UserId::new("staff"));

    // Frozen after closing.
    let err = desk
        .record_message(&guild, ticket.number, line("a", "too late"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommunityError::TicketClosed(_)));
}

#[tokio::test]
async fn closing_twice_is_rejected() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");
    let ticket = desk
        .open_ticket(&guild, UserId::new("a"), TicketKind::PurchaseHelp, "help", ChannelId::new(1))
        .await
        .unwrap();

    desk.close_ticket(&guild, ticket.number).await.unwrap();
    assert!(matches!(
        desk.close_ticket(&guild, ticket.number).await.unwrap_err(),
        CommunityError::TicketClosed(1)
    ));
    assert!(matches!(
        desk.close_ticket(&guild, 99).await.unwrap_err(),
        CommunityError::TicketNotFound(99)
    ));
}

#[tokio::test]
async fn open_tickets_lists_only_open_ones() {
    let dir = tempdir().unwrap();
    let desk = TicketDesk::open(dir.path()).unwrap();
    let guild = GuildId::new("g1");

    let first = desk
        .open_ticket(&guild, UserId::new("a"), TicketKind::ProductAdvice, "q", ChannelId::new(1))
        .await
        .unwrap();
    desk.open_ticket(&guild, UserId::new("b"), TicketKind::IssueReport, "bug", ChannelId::new(2))
        .await
        .unwrap();
    desk.close_ticket(&guild, first.number).await.unwrap();

    let open = desk.open_tickets(&guild).await;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].number, 2);
    assert!(desk.open_tickets(&GuildId::new("empty")).await.is_empty());
}

#[tokio::test]
async fn tickets_survive_a_restart() {
    let dir = tempdir().unwrap();
    let guild = GuildId::new("g1");
    {
        let desk = TicketDesk::open(dir.path()).unwrap();
        let ticket = desk
            .open_ticket(&guild, UserId::new("a"), TicketKind::IssueReport, "bug", ChannelId::new(1))
            .await
            .unwrap();
        desk.record_message(&guild, ticket.number, line("a", "details"))
            .await
            .unwrap();
    }

    let desk = TicketDesk::open(dir.path()).unwrap();
    let ticket = desk.ticket(&guild, 1).await.unwrap();
    assert_eq!(ticket.kind, TicketKind::IssueReport);
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.messages.len(), 1);

    // The counter picks up where it left off.
    let next = desk
        .open_ticket(&guild, UserId::new("b"), TicketKind::ProductAdvice, "q", ChannelId::new(2))
        .await
        .unwrap();
    assert_eq!(next.number, 2);
}
