use std::fs;
use std::path::Path;

use battle_content::{Catalog, ContentFactory};
use battle_core::env::{BossOracle, CreatureOracle, ItemOracle, RulesOracle, TypeChartOracle};
use battle_core::{BossId, CreatureId, Element, ItemId, ItemKind};

const FILES: [(&str, &str); 7] = [
    ("config.toml", include_str!("../data/config.toml")),
    ("creatures.ron", include_str!("../data/creatures.ron")),
    ("skills.ron", include_str!("../data/skills.ron")),
    ("bosses.ron", include_str!("../data/bosses.ron")),
    ("encounters.ron", include_str!("../data/encounters.ron")),
    ("items.ron", include_str!("../data/items.ron")),
    ("type_chart.ron", include_str!("../data/type_chart.ron")),
];

fn write_pack(dir: &Path) {
    for (name, content) in FILES {
        fs::write(dir.join(name), content).expect("write data file");
    }
}

#[test]
fn loads_catalog_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_pack(dir.path());

    let catalog = ContentFactory::new(dir.path())
        .load_catalog()
        .expect("catalog loads");

    let wyrm = catalog.boss(BossId(1)).expect("boss 1");
    assert_eq!(wyrm.max_hp, Some(420));
    assert_eq!(catalog.creature(CreatureId(7)).map(|c| c.catch_rate), Some(3));
    assert_eq!(
        catalog.item(ItemId(2)).map(|i| i.kind),
        Some(ItemKind::Capture { bonus_pct: 150 })
    );
    assert_eq!(catalog.effectiveness(Element::Electric, Element::Ground), 0);
    assert_eq!(catalog.effectiveness(Element::Psychic, Element::Dark), 100);
    assert_eq!(catalog.rules().damage_roll_min_pct, 85);
}

#[test]
fn directory_and_bundled_pack_agree() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_pack(dir.path());

    let loaded = ContentFactory::new(dir.path())
        .load_catalog()
        .expect("catalog loads");
    let bundled = Catalog::bundled().expect("bundled loads");
    assert_eq!(loaded.skills().count(), bundled.skills().count());
    assert_eq!(loaded.type_chart(), bundled.type_chart());
}

#[test]
fn malformed_file_reports_which_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_pack(dir.path());
    fs::write(dir.path().join("skills.ron"), "(skills: [ (id: 1, name: ").expect("write");

    let err = ContentFactory::new(dir.path())
        .load_catalog()
        .expect_err("broken skills");
    assert!(err.to_string().contains("skill catalog"), "{err}");
}

#[test]
fn dangling_reference_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_pack(dir.path());
    fs::write(
        dir.path().join("encounters.ron"),
        "(encounters: [(slot: 1, name: \"ghost town\", party: [(species: 99, level: 3)])])",
    )
    .expect("write");

    let err = ContentFactory::new(dir.path())
        .load_catalog()
        .expect_err("unknown species");
    assert!(err.to_string().contains("CreatureId#99"), "{err}");
}
