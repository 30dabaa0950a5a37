use std::fs;

use barcard::{Card, MAX_CARDS, Selector, Symbology, Wallet, WalletHeader};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample_wallet() -> Wallet {
    let mut wallet = Wallet::new(WalletHeader::new());
    wallet
        .append_card(Card::new("Grocer", "5901234123457", Some("orange"), Selector::Auto).unwrap())
        .unwrap();
    wallet
        .append_card(Card::new("Library", "LIB-0042", None, Selector::Code39).unwrap())
        .unwrap();
    wallet
        .append_card(Card::new("Gym", "8800123456", Some("#535bff"), Selector::Code128).unwrap())
        .unwrap();
    wallet
}

#[test]
fn wallet_round_trips_through_jsonl() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.jsonl");
    let mut wallet = sample_wallet();
    wallet.header.bright = true;
    wallet.log_action("seed");
    wallet.save(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains(r#""kind":"header""#));
    assert!(lines[1].contains(r#""kind":"card""#));

    let loaded = Wallet::load(&path).unwrap();
    assert_eq!(loaded.header, wallet.header);
    assert_eq!(loaded.cards, wallet.cards);
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.hash().unwrap(), wallet.hash().unwrap());
}

#[test]
fn loaded_cards_encode_with_their_selector() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.jsonl");
    sample_wallet().save(&path).unwrap();
    let wallet = Wallet::load(&path).unwrap();

    let symbologies: Vec<Symbology> = (0..wallet.cards.len())
        .map(|i| wallet.encode_card(i).unwrap().symbology)
        .collect();
    assert_eq!(
        symbologies,
        vec![Symbology::Ean13, Symbology::Code39, Symbology::Code128]
    );
    assert!(wallet.encode_card(3).is_err());
}

#[test]
fn unencodable_card_reports_position_and_name() {
    let mut wallet = Wallet::new(WalletHeader::new());
    wallet
        .append_card(Card::new("Cafe", "lower", None, Selector::Code39).unwrap())
        .unwrap();
    let err = wallet.encode_card(0).unwrap_err();
    assert!(err.to_string().contains("card 1 ('Cafe')"));
}

#[test]
fn load_rejects_malformed_files() {
    let dir = tempdir().unwrap();

    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "").unwrap();
    assert!(Wallet::load(&empty).is_err());

    let headless = dir.path().join("headless.jsonl");
    fs::write(
        &headless,
        r##"{"kind":"card","name":"A","code":"1","color":"#12D612","selector":"auto"}"##,
    )
    .unwrap();
    assert!(Wallet::load(&headless).is_err());

    let missing = dir.path().join("missing.jsonl");
    assert!(Wallet::load(&missing).is_err());
}

#[test]
fn overfull_wallet_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wallet.jsonl");
    let mut wallet = Wallet::new(WalletHeader::new());
    wallet.save(&path).unwrap();
    let mut contents = fs::read_to_string(&path).unwrap();
    for i in 0..=MAX_CARDS {
        contents.push_str(&format!(
            "{{\"kind\":\"card\",\"name\":\"C{i}\",\"code\":\"{i}\"}}\n"
        ));
    }
    fs::write(&path, contents).unwrap();
    assert!(Wallet::load(&path).is_err());
}

#[test]
fn backup_moves_cards_between_wallets() {
    let source = sample_wallet();
    let json = source.export_backup().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["barcodes"][1]["type"], 2);
    assert_eq!(value["barcodes"][0]["color"], "#FEB300");
    assert_eq!(value["bright"], false);

    let dir = tempdir().unwrap();
    let path = dir.path().join("restored.jsonl");
    let mut target = Wallet::new(WalletHeader::new());
    target
        .append_card(Card::new("Old", "OLD", None, Selector::Auto).unwrap())
        .unwrap();
    assert_eq!(target.import_backup(&json).unwrap(), 3);
    target.save(&path).unwrap();

    let reloaded = Wallet::load(&path).unwrap();
    assert_eq!(reloaded.cards, source.cards);
}
