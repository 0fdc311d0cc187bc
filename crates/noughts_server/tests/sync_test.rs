//! Two in-process clients playing through the sync state machine.

use noughts_board::{Cell, Marker, Position};
use noughts_server::players::Scripted;
use noughts_server::{
    GameService, LocalTransport, PlayerId, SessionOutcome, Slot, SyncSession, SyncSettings,
    SyncState,
};
use std::time::Duration;

fn settings() -> SyncSettings {
    SyncSettings::new(Duration::from_millis(5), Duration::from_millis(200))
}

fn session(
    service: &GameService,
    id: u64,
    marker: Marker,
    tiles: impl IntoIterator<Item = Position>,
) -> SyncSession<LocalTransport, Scripted> {
    SyncSession::new(
        PlayerId::from(id),
        LocalTransport::new(service.clone()),
        Scripted::new(format!("player-{id}"), marker, tiles),
        settings(),
    )
}

async fn play_out(
    first: &mut SyncSession<LocalTransport, Scripted>,
    second: &mut SyncSession<LocalTransport, Scripted>,
) -> (SessionOutcome, SessionOutcome) {
    // Register the first client before racing so slots are deterministic.
    assert_eq!(first.step().await.unwrap(), SyncState::AssigningMarker);

    let (a, b) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(first.run(), second.run())
    })
    .await
    .expect("game did not finish");
    (a.unwrap(), b.unwrap())
}

#[tokio::test]
async fn test_scripted_game_ends_with_one_winner() {
    use Position::*;
    let service = GameService::new();
    let mut alice = session(&service, 11, Marker::X, [TopLeft, TopCenter, TopRight]);
    let mut bob = session(&service, 22, Marker::O, [MiddleLeft, Center, BottomRight]);

    let outcomes = play_out(&mut alice, &mut bob).await;
    assert_eq!(outcomes, (SessionOutcome::Won, SessionOutcome::Lost));

    assert_eq!(alice.marker(), Some(Marker::X));
    assert_eq!(bob.marker(), Some(Marker::O));
    assert_eq!(alice.board(), bob.board());
    assert_eq!(alice.board(), &service.board().await);
    assert_eq!(alice.board().get(TopRight), Cell::Marked(Marker::X));
    assert_eq!(alice.board().get(BottomRight), Cell::Empty);
}

#[tokio::test]
async fn test_second_player_marker_follows_first_choice() {
    use Position::*;
    let service = GameService::new();
    let mut alice = session(&service, 11, Marker::O, [Center, TopLeft, BottomRight]);
    let mut bob = session(&service, 22, Marker::O, [TopRight, MiddleLeft, BottomLeft]);

    let outcomes = play_out(&mut alice, &mut bob).await;
    assert_eq!(outcomes, (SessionOutcome::Won, SessionOutcome::Lost));
    assert_eq!(bob.marker(), Some(Marker::X));
    assert_eq!(alice.board().get(Center), Cell::Marked(Marker::O));
    assert_eq!(bob.board().get(TopRight), Cell::Marked(Marker::X));
}

#[tokio::test]
async fn test_scripted_game_ends_in_draw_for_both() {
    use Position::*;
    let service = GameService::new();
    let mut alice = session(
        &service,
        11,
        Marker::X,
        [TopLeft, TopRight, MiddleLeft, BottomCenter, BottomRight],
    );
    let mut bob = session(
        &service,
        22,
        Marker::O,
        [TopCenter, Center, MiddleRight, BottomLeft],
    );

    let outcomes = play_out(&mut alice, &mut bob).await;
    assert_eq!(outcomes, (SessionOutcome::Draw, SessionOutcome::Draw));
    assert!(alice.board().check_full());
    assert!(!alice.board().check_win());
    assert_eq!(alice.state(), SyncState::Terminal(SessionOutcome::Draw));
}

#[tokio::test]
async fn test_players_observe_every_synchronized_board() {
    use Position::*;
    let service = GameService::new();
    let mut alice = session(&service, 11, Marker::X, [TopLeft, TopCenter, TopRight]);
    let mut bob = session(&service, 22, Marker::O, [MiddleLeft, Center, BottomRight]);
    play_out(&mut alice, &mut bob).await;

    let seen = alice.player().seen();
    assert!(seen.first().is_some_and(|board| board.empty_cells().len() == 9));
    assert!(seen.last().is_some_and(|board| board.check_win()));
}

#[tokio::test]
async fn test_third_client_is_rejected() {
    let service = GameService::new();
    service.connect(PlayerId::from(11)).await;
    service.connect(PlayerId::from(22)).await;

    let mut carol = session(&service, 33, Marker::X, Vec::<Position>::new());
    let outcome = carol.run().await.unwrap();
    assert_eq!(outcome, SessionOutcome::Rejected);
    assert_eq!(carol.state(), SyncState::Rejected);
    assert_eq!(carol.marker(), None);
}

#[tokio::test]
async fn test_rejoin_restores_marker_board_and_turn() {
    let service = GameService::new();
    service.connect(PlayerId::from(11)).await;
    service.connect(PlayerId::from(22)).await;
    service
        .set_marker(&PlayerId::from(11), Marker::X)
        .await
        .unwrap();
    service
        .commit_move(&PlayerId::from(11), Position::Center)
        .await
        .unwrap();

    let mut bob = session(&service, 22, Marker::X, [Position::TopLeft]);
    assert_eq!(bob.step().await.unwrap(), SyncState::Rejoining(Slot::Second));
    assert_eq!(bob.step().await.unwrap(), SyncState::PollingTurn);
    assert_eq!(bob.marker(), Some(Marker::O));
    assert_eq!(bob.board().get(Position::Center), Cell::Marked(Marker::X));

    // It is already bob's turn, so polling goes straight to moving.
    assert_eq!(bob.step().await.unwrap(), SyncState::Moving);
    assert_eq!(bob.step().await.unwrap(), SyncState::PollingTurn);
    assert_eq!(service.current_turn().await, Some(PlayerId::from(11)));
    assert_eq!(
        service.board().await.get(Position::TopLeft),
        Cell::Marked(Marker::O)
    );
}

#[tokio::test]
async fn test_returning_first_player_without_marker_chooses_again() {
    let service = GameService::new();
    service.connect(PlayerId::from(11)).await;

    let mut alice = session(&service, 11, Marker::O, Vec::<Position>::new());
    assert_eq!(alice.step().await.unwrap(), SyncState::Rejoining(Slot::First));
    assert_eq!(alice.step().await.unwrap(), SyncState::AssigningMarker);
    assert_eq!(alice.step().await.unwrap(), SyncState::PollingTurn);
    assert_eq!(service.first_marker().await, Some(Marker::O));
}

#[tokio::test]
async fn test_rejoin_after_game_over_is_terminal() {
    use Position::*;
    let service = GameService::new();
    let mut alice = session(&service, 11, Marker::X, [TopLeft, TopCenter, TopRight]);
    let mut bob = session(&service, 22, Marker::O, [MiddleLeft, Center, BottomRight]);
    play_out(&mut alice, &mut bob).await;

    let mut alice_again = session(&service, 11, Marker::X, Vec::<Position>::new());
    assert_eq!(alice_again.run().await.unwrap(), SessionOutcome::Won);
    let mut bob_again = session(&service, 22, Marker::O, Vec::<Position>::new());
    assert_eq!(bob_again.run().await.unwrap(), SessionOutcome::Lost);
}
