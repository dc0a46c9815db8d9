mod common;

use common::{login, server};
use rpgchat::chat::SessionState;

#[test]
fn join_lists_members_and_announces_newcomer() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let mut bob = login(&mut server, "bob");

    server.handle_line(alice.id, "/join tavern");
    assert_eq!(
        alice.lines(),
        vec![
            "<= entering room: tavern",
            "<= * alice (** this is you)",
            "<= end of list."
        ]
    );
    assert_eq!(server.session_state(alice.id), Some(SessionState::ChatRoom));

    server.handle_line(bob.id, "/join tavern");
    assert_eq!(
        bob.lines(),
        vec![
            "<= entering room: tavern",
            "<= * alice",
            "<= * bob (** this is you)",
            "<= end of list."
        ]
    );
    assert_eq!(alice.lines(), vec!["<= * new user joined chat: bob"]);
}

#[test]
fn room_chat_stays_in_the_room_and_echoes() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let mut bob = login(&mut server, "bob");
    let mut carol = login(&mut server, "carol");
    server.handle_line(alice.id, "/join tavern");
    server.handle_line(bob.id, "/join tavern");
    alice.lines();
    bob.lines();

    server.handle_line(bob.id, "hi alice");
    assert_eq!(alice.lines(), vec!["<= bob: hi alice"]);
    assert_eq!(bob.lines(), vec!["<= bob: hi alice"]);
    assert!(carol.lines().is_empty());
}

#[test]
fn rooms_listing_counts_members() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let bob = login(&mut server, "bob");
    let carol = login(&mut server, "carol");
    server.handle_line(bob.id, "/join attic");
    server.handle_line(carol.id, "/join attic");
    server.handle_line(alice.id, "/join cellar");
    alice.lines();

    server.handle_line(alice.id, "/rooms");
    assert_eq!(
        alice.lines(),
        vec![
            "<= Active rooms are:",
            "<= * attic (2)",
            "<= * cellar (1)",
            "<= end of list."
        ]
    );
}

#[test]
fn leave_notifies_and_last_member_deletes_room() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let mut bob = login(&mut server, "bob");
    server.handle_line(alice.id, "/join tavern");
    server.handle_line(bob.id, "/join tavern");
    alice.lines();
    bob.lines();

    server.handle_line(bob.id, "/leave");
    assert_eq!(alice.lines(), vec!["<= * user has left chat: bob"]);
    assert_eq!(bob.lines(), vec!["<= * user has left chat: bob (** this is you)"]);
    assert_eq!(server.session_state(bob.id), Some(SessionState::Lobby));
    assert!(server.rooms().contains("tavern"));

    server.handle_line(alice.id, "/leave");
    assert!(!server.rooms().contains("tavern"));

    // Nothing to leave: no output, still in the lobby.
    server.handle_line(alice.id, "/leave");
    assert!(alice.lines().iter().all(|l| l.contains("user has left chat: alice")));
    assert_eq!(server.session_state(alice.id), Some(SessionState::Lobby));
}

#[test]
fn joining_another_room_leaves_the_first() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let mut bob = login(&mut server, "bob");
    server.handle_line(alice.id, "/join tavern");
    server.handle_line(bob.id, "/join tavern");
    alice.lines();

    server.handle_line(bob.id, "/join attic");
    assert_eq!(alice.lines(), vec!["<= * user has left chat: bob"]);
    assert_eq!(server.session_room(bob.id).as_deref(), Some("attic"));
    assert_eq!(server.rooms().members("tavern").unwrap(), ["alice".to_string()]);
}

#[test]
fn abrupt_disconnect_is_silent_graceful_is_not() {
    let mut server = server();
    let mut alice = login(&mut server, "alice");
    let bob = login(&mut server, "bob");
    let carol = login(&mut server, "carol");
    for id in [alice.id, bob.id, carol.id] {
        server.handle_line(id, "/join tavern");
    }
    alice.lines();

    server.disconnect(bob.id, true);
    assert!(alice.lines().is_empty());
    assert_eq!(server.rooms().members("tavern").unwrap().len(), 2);

    server.disconnect(carol.id, false);
    assert_eq!(alice.lines(), vec!["<= * user has left chat: carol"]);
    assert_eq!(server.rooms().members("tavern").unwrap(), ["alice".to_string()]);
}
