use kingdoms_core::{
    ActionDef, ActionId, Attributes, Catalog, Hero, InfluenceKey, InfluenceModel, NoInfluence, Player,
    RequiredScope, RngState,
};
use kingdoms_search::{
    expand_choices, find_best_sequence, find_best_sequence_with, SearchConfig, SearchReport,
};

fn two_actions() -> Catalog {
    Catalog::from_defs(vec![
        ActionDef::new("A", Attributes::attack(1.0)).with_influence("B", RequiredScope::Any),
        ActionDef::new("B", Attributes::support(1.0)).with_scopes([1]),
    ])
    .expect("catalog")
}

fn full_hp(catalog: &Catalog, hand: &[&str]) -> Player {
    Player::new("p", Hero::new("白板", 4, 4))
        .with_hand(catalog, hand)
        .expect("hand")
}

#[test]
fn lone_action_is_played_alone() {
    let catalog = two_actions();
    let model = InfluenceModel::initialize_with(&catalog, |_| Attributes::attack(1.0));
    let me = full_hp(&catalog, &["A"]);
    let opp = full_hp(&catalog, &[]);
    let outcome = find_best_sequence(&catalog, &model, &me, &opp).expect("search");
    assert_eq!(outcome.sequence.len(), 1);
    assert_eq!(outcome.sequence[0].action(), catalog.id("A").expect("id"));
    assert_eq!(outcome.score, 1.0);
}

#[test]
fn influence_decides_the_order() {
    let catalog = two_actions();
    let model = InfluenceModel::initialize_with(&catalog, |_| Attributes::support(2.0));
    let me = full_hp(&catalog, &["A", "B"]);
    let opp = full_hp(&catalog, &[]);
    let outcome = find_best_sequence(&catalog, &model, &me, &opp).expect("search");

    let a = catalog.id("A").expect("id");
    let b = catalog.id("B").expect("id");
    assert_eq!(outcome.sequence.len(), 2);
    assert_eq!(outcome.sequence[0].action(), a);
    assert_eq!(outcome.sequence[1].action(), b);
    assert_eq!(outcome.sequence[1].scope(), Some(1));
    // base(A) + base(B) + support modifier, all weights 1 at full health
    assert_eq!(outcome.score, 1.0 + 1.0 + 2.0);
}

#[test]
fn repeated_searches_agree() {
    let catalog = Catalog::from_defs(vec![
        ActionDef::new("A", Attributes::attack(1.0)).with_influence("B", RequiredScope::Any),
        ActionDef::new("B", Attributes::support(1.0))
            .with_scopes([1, 2])
            .with_influence("C", RequiredScope::Exact(2)),
        ActionDef::new("C", Attributes::new(0.5, 0.5, 0.0)),
    ])
    .expect("catalog");
    let mut rng = RngState::from_seed(17);
    let model = InfluenceModel::initialize(&catalog, &mut rng);
    let me = Player::new("me", Hero::new("h", 4, 2))
        .with_hand(&catalog, &["C", "B", "A"])
        .expect("hand");
    let opp = Player::new("opp", Hero::new("h", 4, 3));

    let first = find_best_sequence(&catalog, &model, &me, &opp).expect("search");
    let second = find_best_sequence(&catalog, &model, &me, &opp).expect("search");
    assert_eq!(first.sequence, second.sequence);
    assert_eq!(first.score, second.score);
    assert!(first.complete);
}

#[test]
fn result_uses_only_legal_choices_within_bounds() {
    let catalog = Catalog::from_defs(vec![
        ActionDef::new("A", Attributes::attack(1.0)).with_influence("B", RequiredScope::Exact(3)),
        ActionDef::new("B", Attributes::support(0.5)).with_scopes([1, 3]),
    ])
    .expect("catalog");
    let model = InfluenceModel::initialize_with(&catalog, |_| Attributes::new(0.1, 0.2, 0.3));
    let me = full_hp(&catalog, &["B", "A"]);
    let opp = full_hp(&catalog, &[]);
    let config = SearchConfig::default();
    let expanded = expand_choices(&catalog, &me.hand, config.scope_policy).expect("expand");
    let outcome = find_best_sequence_with(&catalog, &model, &me, &opp, &config).expect("search");

    assert!(outcome.sequence.len() <= expanded.len());
    for choice in &outcome.sequence {
        let def = catalog.get(choice.action());
        assert!(me.hand.contains(&choice.action()));
        match choice.scope() {
            Some(scope) => assert!(def.scope_options.contains(&scope)),
            None => assert!(def.scope_options.is_empty()),
        }
    }
}

#[test]
fn without_influences_every_positive_choice_is_played() {
    let catalog = Catalog::from_defs(vec![
        ActionDef::new("strike", Attributes::attack(1.5)),
        ActionDef::new("dodge", Attributes::defense(0.5)),
        ActionDef::new("blunder", Attributes::attack(-1.0)),
        ActionDef::new("idle", Attributes::zero()),
        ActionDef::new("heal", Attributes::support(1.0)).with_scopes([1, 2]),
    ])
    .expect("catalog");
    let me = Player::new("me", Hero::new("h", 4, 2))
        .with_hand(&catalog, &["dodge", "blunder", "strike", "idle", "heal"])
        .expect("hand");
    let opp = Player::new("opp", Hero::new("h", 4, 1));
    let outcome = find_best_sequence(&catalog, &NoInfluence, &me, &opp).expect("search");

    let weights = outcome.weights;
    let mut expected: Vec<(String, Option<i32>, f64)> = vec![
        ("strike".into(), None, 1.5 * weights.attack),
        ("dodge".into(), None, 0.5 * weights.defense),
        ("heal".into(), Some(1), 1.0),
        ("heal".into(), Some(2), 1.0),
    ];
    expected.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut played: Vec<(String, Option<i32>, f64)> = outcome
        .sequence
        .iter()
        .map(|c| {
            let def = catalog.get(c.action());
            let score = def.base.attack * weights.attack
                + def.base.defense * weights.defense
                + def.base.support * weights.support;
            (def.name.clone(), c.scope(), score)
        })
        .collect();
    played.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.1.cmp(&b.1)));
    expected.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.1.cmp(&b.1)));
    assert_eq!(played, expected);

    let total: f64 = expected.iter().map(|e| e.2).sum();
    assert!((outcome.score - total).abs() < 1e-12);
}

#[test]
fn report_lists_the_recommendation() {
    let catalog = two_actions();
    let model = InfluenceModel::initialize_with(&catalog, |_| Attributes::support(2.0));
    let me = full_hp(&catalog, &["B", "A"]);
    let opp = full_hp(&catalog, &["A"]);
    let outcome = find_best_sequence(&catalog, &model, &me, &opp).expect("search");
    let report = SearchReport::new(&catalog, &model, &me, &opp, &outcome);

    assert_eq!(report.recommended, "A -> B@1");
    assert_eq!(report.breakdown.positions.len(), 2);
    assert_eq!(report.breakdown.total, outcome.score);
    let text = report.to_text_report();
    assert!(text.contains("recommended/推荐: A -> B@1"));
    assert!(text.contains("hand/手牌: B, A"));
    let key = InfluenceKey::new("A", "B", RequiredScope::Any);
    assert_eq!(model.get(&key), Some(Attributes::support(2.0)));
}

#[test]
fn report_labels_opponent_cards_missing_from_the_catalog() {
    let catalog = two_actions();
    let me = full_hp(&catalog, &["A"]);
    let mut opp = full_hp(&catalog, &["B"]);
    opp.hand.push(ActionId(99));
    let outcome = find_best_sequence(&catalog, &NoInfluence, &me, &opp).expect("search");
    let report = SearchReport::new(&catalog, &NoInfluence, &me, &opp, &outcome);
    assert_eq!(report.opponent.hand, vec!["B".to_string(), "#99".to_string()]);
    assert!(report.to_text_report().contains("hand/手牌: B, #99"));
}
