use std::env;

use gooz::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Create { name: String, color: String },
    Join { game_id: String, name: String, color: String },
    Start,
    Roll,
    Buy,
    Pass,
    Sell(String),
    Pay,
    JailRoll,
    Chat(String),
    Select(Option<u8>),
    Dismiss,
    State,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    match word {
        "create" => match args.as_slice() {
            [name, color] => Ok(Command::Create {
                name: (*name).into(),
                color: (*color).into(),
            }),
            _ => Err("usage: create <name> <color>".into()),
        },
        "join" => match args.as_slice() {
            [game_id, name, color] => Ok(Command::Join {
                game_id: (*game_id).into(),
                name: (*name).into(),
                color: (*color).into(),
            }),
            _ => Err("usage: join <game-id> <name> <color>".into()),
        },
        "start" => Ok(Command::Start),
        "roll" => Ok(Command::Roll),
        "buy" => Ok(Command::Buy),
        "pass" => Ok(Command::Pass),
        "sell" if !rest.is_empty() => Ok(Command::Sell(rest.into())),
        "sell" => Err("usage: sell <property>".into()),
        "pay" => Ok(Command::Pay),
        "jailroll" => Ok(Command::JailRoll),
        "chat" | "say" => Ok(Command::Chat(rest.into())),
        "select" => match args.as_slice() {
            [] => Ok(Command::Select(None)),
            [card] => card
                .parse()
                .map(|c| Command::Select(Some(c)))
                .map_err(|_| format!("not a card number: {card}")),
            _ => Err("usage: select [card]".into()),
        },
        "ok" | "dismiss" => Ok(Command::Dismiss),
        "state" => Ok(Command::State),
        "help" | "" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

const HELP: &str = "\
commands:
  create <name> <color>         create a game
  join <game-id> <name> <color> join a game
  start | roll | buy | pass     turn actions
  sell <property>               sell to cover rent
  pay | jailroll                leave jail
  chat <text>                   send a chat line
  select [card]                 select or clear a card
  ok                            dismiss notices
  state                         print the current state
  quit";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(state: &GameState) -> String {
    let mut out = String::new();
    let game = state.game_id.as_ref().map_or("-".to_owned(), ToString::to_string);
    let turn = state
        .current_turn
        .as_ref()
        .map_or("-".to_owned(), ToString::to_string);
    out.push_str(&format!("game {game}  turn {turn}  pending {:?}\n", state.pending));

    for p in &state.players {
        let me = if state.is_local(&p.id) { "*" } else { " " };
        let cell = board_position(p.position)
            .map_or_else(|| "?".to_owned(), |c| c.to_string());
        out.push_str(&format!(
            "{me} {:<12} cell {:>2}  ${:<6} {}\n",
            p.name,
            cell,
            p.pool_amt,
            p.owned_properties.join(", "),
        ));
    }
    if let Some(offer) = &state.offer {
        out.push_str(&format!("  offer: {} for ${}\n", offer.name, offer.price));
    }
    if let Some(prompt) = &state.liquidation {
        out.push_str(&format!(
            "  rent ${} due, short ${}; sell one of: {}\n",
            prompt.rent_amount,
            prompt.shortfall(),
            prompt.owned_properties.join(", "),
        ));
    }
    if let Some(notice) = &state.rent_notice {
        out.push_str(&format!(
            "  paid ${} rent to {} for {}\n",
            notice.amount, notice.owner_name, notice.property_name
        ));
    }
    if let Some(notice) = &state.jail_notice {
        let outcome = if notice.escaped { "escaped" } else { "still jailed" };
        out.push_str(&format!("  jail roll {}: {outcome}\n", notice.dice));
    }
    if let Some(banner) = &state.error_banner {
        out.push_str(&format!("  error: {banner}\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

async fn build_client() -> Result<GoozClient, GoozError> {
    let mut builder = GoozClient::builder()
        .url(env::var("GOOZ_URL").unwrap_or_else(|_| gooz::DEFAULT_URL.to_owned()))
        .error_policy(ErrorPolicy::Banner);
    if let Ok(player_id) = env::var("GOOZ_PLAYER_ID") {
        builder = builder.player_id(player_id);
    }

    match env::var("GOOZ_SESSION_FILE") {
        Ok(path) => builder.store(FileStore::new(path)).build().await,
        Err(_) => builder.build().await,
    }
}

fn run_command(client: &GoozClient, command: Command) -> Result<(), ActionError> {
    match command {
        Command::Create { name, color } => client.create_game(&PlayerProfile::new(name, color)),
        Command::Join { game_id, name, color } => {
            client.join_game(&GameId::from(game_id), &PlayerProfile::new(name, color))
        }
        Command::Start => client.start_game(),
        Command::Roll => client.roll_dice(),
        Command::Buy => client.buy_property(),
        Command::Pass => client.pass_property(),
        Command::Sell(name) => client.sell_property(&name),
        Command::Pay => client.pay_jail_fine(),
        Command::JailRoll => client.roll_for_jail(),
        Command::Chat(text) => client.send_chat(&text),
        Command::Select(card) => {
            client.dispatch(LocalEvent::SelectCard(card));
            Ok(())
        }
        Command::Dismiss => {
            client.dispatch(LocalEvent::DismissRentNotice);
            client.dispatch(LocalEvent::DismissJailNotice);
            client.dispatch(LocalEvent::DismissLiquidation);
            client.dispatch(LocalEvent::DismissError);
            Ok(())
        }
        Command::State => {
            print!("{}", render(&client.state()));
            Ok(())
        }
        Command::Help | Command::Quit => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), GoozError> {
    gooz::telemetry::init();

    let client = build_client().await?;
    client.connect();
    info!(status = ?client.link_status(), "console client started; type `help`");

    let mut states = client.subscribe();
    let printer = tokio::spawn(async move {
        let mut seen_chat = 0;
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            for entry in state.chat.iter().skip(seen_chat) {
                println!("<{}> {}", entry.player_name, entry.message);
            }
            seen_chat = state.chat.len();
            print!("{}", render(&state));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(command) => {
                if let Err(e) = run_command(&client, command) {
                    warn!(error = %e, "command refused");
                }
            }
            Err(usage) => println!("{usage}"),
        }
    }

    client.shutdown().await;
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lobby_commands() {
        assert_eq!(
            parse("create Ann #FF0000").unwrap(),
            Command::Create {
                name: "Ann".into(),
                color: "#FF0000".into()
            }
        );
        assert_eq!(
            parse("join 00BF80D3 Bob #00FF00").unwrap(),
            Command::Join {
                game_id: "00BF80D3".into(),
                name: "Bob".into(),
                color: "#00FF00".into()
            }
        );
        assert!(parse("create Ann").is_err());
    }

    #[test]
    fn test_parse_keeps_multi_word_arguments() {
        assert_eq!(
            parse("sell  Baltic Avenue ").unwrap(),
            Command::Sell("Baltic Avenue".into())
        );
        assert_eq!(parse("chat good game").unwrap(), Command::Chat("good game".into()));
        assert!(parse("sell").is_err());
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(parse("select 3").unwrap(), Command::Select(Some(3)));
        assert_eq!(parse("select").unwrap(), Command::Select(None));
        assert!(parse("select x").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse("fly").is_err());
        assert_eq!(parse("").unwrap(), Command::Help);
    }

    #[test]
    fn test_render_marks_local_player() {
        let state = GameState {
            game_id: Some(GameId::from("g1")),
            player_id: Some(PlayerId::from("p1")),
            players: vec![Player {
                id: PlayerId::from("p1"),
                name: "Ann".into(),
                color_code: "#FF0000".into(),
                position: 0,
                pool_amt: 1500,
                owned_properties: Vec::new(),
            }],
            ..Default::default()
        };
        let text = render(&state);
        assert!(text.contains("game g1"));
        assert!(text.contains("* Ann"));
    }
}
