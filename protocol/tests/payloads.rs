use common::{CharacterStats, Element, Winner};
use protocol::codec::{PayloadError, decode_battle_script, decode_character};
use protocol::message::{BattleAction, FusionRequest};
use protocol::scene::ShapeKind;

const FENCED_CHARACTER: &str = r##"Here is your monster!
```json
{
  "model": {
    "type": "group",
    "position": [0, 1.5, 0],
    "children": [
      { "type": "sphere", "color": "#ffcc00", "scale": [.8, .8, .8], "part": "head", },
      { "type": "cylinder", "position": [-.2, -.9, 0], "scale": [0.16, 1.0, 0.16], "part": "leg_fl" },
    ]
  },
  "stats": { "name": "Sunny", "hp": 120, "attack": 60, "defense": 40, "speed": 55,
             "element": "light", "rarity": 2 }
}
```"##;

fn sample_stats(name: &str, hp: u32, rarity: u32) -> CharacterStats {
    CharacterStats {
        name: name.into(),
        hp,
        attack: 60,
        defense: 40,
        speed: 50,
        element: Element::Water,
        rarity,
        ..Default::default()
    }
}

#[test]
fn fenced_character_with_bare_decimals_decodes() {
    let definition = decode_character(FENCED_CHARACTER)
        .expect("payload should decode")
        .into_generated(|| panic!("stats are present"));

    assert_eq!(definition.stats.name, "Sunny");
    assert_eq!(definition.stats.element, Element::Light);
    assert_eq!(definition.model.shape, ShapeKind::Group);
    assert_eq!(definition.model.children.len(), 2);
    assert_eq!(definition.model.children[0].scale, Some([0.8, 0.8, 0.8]));
    assert_eq!(definition.model.children[1].position, Some([-0.2, -0.9, 0.0]));
}

#[test]
fn bare_model_object_is_accepted() {
    let payload = decode_character(r#"{"type":"box","scale":[1,2,3]}"#).unwrap();
    assert_eq!(payload.model.shape, ShapeKind::Box);
    assert!(payload.stats.is_none());

    let definition = payload.into_generated(|| CharacterStats {
        name: "stand-in".into(),
        hp: 90,
        ..Default::default()
    });
    assert_eq!(definition.model.shape, ShapeKind::Box);
    assert_eq!(definition.stats.name, "stand-in");
    assert_eq!(definition.stats.hp, 90);
}

#[test]
fn text_without_json_is_a_hard_failure() {
    assert!(matches!(
        decode_character("Sorry, I cannot help with that."),
        Err(PayloadError::NoJson { .. })
    ));
    assert!(matches!(decode_character("   "), Err(PayloadError::Empty)));
    assert!(matches!(
        decode_character("{ this is not json }"),
        Err(PayloadError::Syntax(_))
    ));
}

#[test]
fn fusion_without_stats_uses_fallback_and_multiplier() {
    let request = FusionRequest {
        char1: sample_stats("Frost", 100, 3),
        char2: sample_stats("Gale", 90, 4),
        is_super: true,
        super_mult: 1.5,
    };
    let fused = decode_character(r#"{"model":{"type":"group","children":[]}}"#)
        .unwrap()
        .into_fusion(&request);

    assert_eq!(fused.stats.name, "Frost×Gale");
    assert_eq!(fused.stats.hp, 225);
    assert_eq!(fused.stats.attack, 117);
    assert_eq!(fused.stats.rarity, 5);
}

#[test]
fn normal_fusion_keeps_service_stats() {
    let request = FusionRequest {
        char1: sample_stats("Frost", 100, 1),
        char2: sample_stats("Gale", 90, 1),
        is_super: false,
        super_mult: 1.5,
    };
    let fused = decode_character(
        r#"{"model":{"type":"group"},"stats":{"name":"Frostgale","hp":300,"element":"wind"}}"#,
    )
    .unwrap()
    .into_fusion(&request);

    assert_eq!(fused.stats.name, "Frostgale");
    assert_eq!(fused.stats.hp, 300);
}

#[test]
fn result_winner_is_forced_to_precomputed_outcome() {
    let script = r#"```json
[
  {"actor":"Ice Wolf","target":"Dark Dragon","action":"attack","damage":80,"text":"Bite!","crit":true},
  {"actor":"SYSTEM","action":"drama","damage":.5e2,"text":"A meteor falls"},
  {"actor":"SYSTEM","action":"fusion_arrive","fusionName":"Frostgale","text":"Arrives"},
  {"actor":"SYSTEM","action":"result","winner":"boss","text":"The end"},
]
```"#;

    let events = decode_battle_script(script, Winner::Party).unwrap();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0].action, BattleAction::Attack);
    assert!(events[0].crit);
    assert_eq!(events[1].damage, 50);
    assert_eq!(events[2].fusion_name.as_deref(), Some("Frostgale"));
    assert_eq!(events[3].action, BattleAction::Result);
    assert_eq!(events[3].winner, Some(Winner::Party));
}

#[test]
fn script_without_array_fails() {
    assert!(matches!(
        decode_battle_script(r#"{"events": "none"}"#, Winner::Boss),
        Err(PayloadError::NoJson { .. })
    ));
}
