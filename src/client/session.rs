use std::str::FromStr;

use shakmaty::Square;

use crate::{
    client::{GameView, Lobby, LobbyEvent},
    models::Color,
    websocket::messages::{ClientMessage, ServerMessage},
};

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Name(String),
    Create,
    Join(String),
    Move { from: String, to: String },
    Moves,
    Board,
    Log,
    Continue,
    Help,
    Quit,
}

pub const HELP: &str = "commands: name <name> | create | join <room> | move <from> <to> (or e2e4) | moves | board | log | continue | quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["name", name @ ..] if !name.is_empty() => Ok(Command::Name(name.join(" "))),
            ["create"] => Ok(Command::Create),
            ["join", room] => Ok(Command::Join(room.to_string())),
            ["move", from, to] | [from, to] if is_square(from) && is_square(to) => {
                Ok(Command::Move {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
            ["moves"] => Ok(Command::Moves),
            ["board"] => Ok(Command::Board),
            ["log"] => Ok(Command::Log),
            ["continue"] => Ok(Command::Continue),
            ["help"] => Ok(Command::Help),
            ["quit"] | ["exit"] => Ok(Command::Quit),
            ["move", uci] | [uci] => match split_uci(uci) {
                Some((from, to)) => Ok(Command::Move {
                    from: from.to_string(),
                    to: to.to_string(),
                }),
                None => Err(format!("unknown command: {}", line.trim())),
            },
            _ => Err(format!("unknown command: {}", line.trim())),
        }
    }
}

fn is_square(s: &str) -> bool {
    s.parse::<Square>().is_ok()
}

/// `e2e4` into its two squares; `str::get` keeps multi-byte input from splitting a char
fn split_uci(uci: &str) -> Option<(Square, Square)> {
    let from = uci.get(..2)?.parse().ok()?;
    let to = uci.get(2..)?.parse().ok()?;
    Some((from, to))
}

/// Result of running a command
#[derive(Debug, Default)]
pub struct Response {
    pub send: Option<ClientMessage>,
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Response {
    fn send(msg: ClientMessage) -> Self {
        Self {
            send: Some(msg),
            ..Self::default()
        }
    }

    fn say(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            ..Self::default()
        }
    }
}

/// Everything one terminal client knows: the lobby and, once seated, the game
#[derive(Debug)]
pub struct ClientSession {
    lobby: Lobby,
    game: Option<GameView>,
}

impl ClientSession {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            lobby: Lobby::new(username),
            game: None,
        }
    }

    pub fn game(&self) -> Option<&GameView> {
        self.game.as_ref()
    }

    pub fn execute(&mut self, command: Command) -> Response {
        match command {
            Command::Name(name) => Response::send(self.lobby.set_username(name)),
            Command::Create => match self.game {
                Some(ref game) => Response::say(format!("already in room {}", game.room())),
                None => Response::send(self.lobby.create_room()),
            },
            Command::Join(room) => match self.game {
                Some(ref game) => Response::say(format!("already in room {}", game.room())),
                None => match self.lobby.join_room(&room) {
                    Some(msg) => Response::send(msg),
                    None => Response::say("Enter a room ID"),
                },
            },
            Command::Move { from, to } => self.play(&from, &to),
            Command::Moves => match self.game {
                Some(ref game) if game.is_my_turn() => {
                    Response::say(game.game().legal_moves().join(" "))
                }
                Some(_) => Response::say("not your turn"),
                None => Response::say("not in a game"),
            },
            Command::Board => match self.game {
                Some(ref game) => Response::say(game.fen()),
                None => Response::say("not in a game"),
            },
            Command::Log => match self.game {
                Some(ref game) => Response {
                    lines: game.log_lines(),
                    ..Response::default()
                },
                None => Response::say("not in a game"),
            },
            Command::Continue => match self.game {
                Some(ref game) if game.over().is_some() => {
                    Response::send(game.continue_after_over())
                }
                Some(_) => Response::say("the game is still running"),
                None => Response::say("not in a game"),
            },
            Command::Help => Response::say(HELP),
            Command::Quit => Response {
                quit: true,
                ..Response::default()
            },
        }
    }

    fn play(&mut self, from: &str, to: &str) -> Response {
        let Some(game) = self.game.as_mut() else {
            return Response::say("not in a game");
        };
        if game.over().is_some() {
            return Response::say("the game is over, type `continue`");
        }
        if game.players().len() < 2 {
            return Response::say("waiting for an opponent");
        }
        if !game.is_my_turn() {
            return Response::say("not your turn");
        }

        match game.on_drop(from, to) {
            Some(msg) => {
                let mut response = Response::send(msg);
                response.lines.extend(over_lines(game));
                response
            }
            None => Response::say(format!("illegal move: {} {}", from, to)),
        }
    }

    /// React to a relay message; returns the lines to show
    pub fn handle_server_message(&mut self, msg: ServerMessage) -> Vec<String> {
        let Some(game) = self.game.as_mut() else {
            return match self.lobby.apply(&msg) {
                LobbyEvent::Entered(view) => {
                    let line = match view.orientation() {
                        Color::White => format!(
                            "room {} created, you play white. waiting for an opponent...",
                            view.room()
                        ),
                        Color::Black => format!(
                            "joined room {}, you play black against {}",
                            view.room(),
                            view.opponent_name().unwrap_or("?")
                        ),
                    };
                    self.game = Some(view);
                    vec![line]
                }
                LobbyEvent::JoinFailed(text) => vec![text],
                LobbyEvent::Ignored => match msg {
                    ServerMessage::Error { message } => vec![format!("error: {}", message)],
                    _ => Vec::new(),
                },
            };
        };

        match msg {
            ServerMessage::Move { mv } => {
                if !game.on_remote_move(&mv) {
                    return vec![format!("opponent sent an illegal move: {} {}", mv.from, mv.to)];
                }
                let mut lines = vec![format!(
                    "opponent played {}",
                    mv.san.unwrap_or_else(|| format!("{} {}", mv.from, mv.to))
                )];
                lines.extend(over_lines(game));
                lines
            }
            ServerMessage::OpponentJoined { players, .. } => {
                game.on_opponent_joined(players);
                vec![format!(
                    "{} joined, you play {}",
                    game.opponent_name().unwrap_or("?"),
                    game.orientation()
                )]
            }
            ServerMessage::PlayerDisconnected { player } => {
                game.on_player_disconnected(&player);
                over_lines(game)
            }
            ServerMessage::CloseRoom { room_id } => {
                if game.on_close_room(&room_id) {
                    self.game = None;
                    vec![format!("room {} closed", room_id)]
                } else {
                    Vec::new()
                }
            }
            ServerMessage::Error { message } => vec![format!("error: {}", message)],
            _ => Vec::new(),
        }
    }
}

fn over_lines(game: &GameView) -> Vec<String> {
    match game.over() {
        Some(text) => vec![text.to_string(), "type `continue` to leave the room".to_string()],
        None => Vec::new(),
    }
}
