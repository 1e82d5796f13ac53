use blockdoc_core::{collect_child_blocks, remap_block_ids, Editor, EditorConfig, SequentialIds};
use blockdoc_test_support::{apply_step, assert_tree, newsletter, pick, Step};
use proptest::prelude::*;

fn step() -> impl Strategy<Value = Step> {
    let n = 0usize..32;
    prop_oneof![
        (n.clone(), 0usize..6).prop_map(|(parent, index)| Step::Add { parent, index }),
        n.clone().prop_map(|parent| Step::AddColumns { parent }),
        (n.clone(), 0usize..3).prop_map(|(parent, column)| Step::AddToColumn { parent, column }),
        n.clone().prop_map(|block| Step::Delete { block }),
        (n.clone(), n.clone(), 0usize..6, prop::option::of(0usize..3)).prop_map(
            |(block, to, index, column)| Step::Move {
                block,
                to,
                index,
                column
            }
        ),
        n.clone().prop_map(|block| Step::Up { block }),
        n.clone().prop_map(|block| Step::Down { block }),
        n.clone().prop_map(|block| Step::Duplicate { block }),
        n.clone().prop_map(|block| Step::Copy { block }),
        n.prop_map(|parent| Step::Paste { parent }),
    ]
}

fn editor(capacity: usize) -> Editor<SequentialIds> {
    let config = EditorConfig {
        history_capacity: capacity,
        ..EditorConfig::default()
    };
    Editor::with_ids(newsletter(), &config, SequentialIds::default())
}

proptest! {
    #[test]
    fn random_edits_keep_a_single_owner_per_block(steps in prop::collection::vec(step(), 1..40)) {
        let mut editor = editor(64);
        for step in &steps {
            apply_step(&mut editor, step);
            assert_tree(editor.document());
            prop_assert!(editor.document().contains("root"));
        }
    }

    #[test]
    fn undo_all_returns_to_start_and_redo_replays(steps in prop::collection::vec(step(), 1..20)) {
        let mut editor = editor(32);
        let initial = editor.document().clone();
        for step in &steps {
            apply_step(&mut editor, step);
        }
        let edited = editor.document().clone();
        let recorded = editor.history().index();

        for _ in 0..recorded {
            prop_assert!(editor.undo().is_applied());
        }
        prop_assert_eq!(editor.document(), &initial);
        prop_assert!(!editor.can_undo());

        for _ in 0..recorded {
            prop_assert!(editor.redo().is_applied());
        }
        prop_assert_eq!(editor.document(), &edited);
        prop_assert!(!editor.can_redo());
    }

    #[test]
    fn remap_never_reuses_subtree_ids(block in 0usize..9) {
        let doc = newsletter();
        let id = pick(&doc, block);
        let subtree = collect_child_blocks(&doc, id.as_str());
        let remapped = remap_block_ids(&subtree, &mut SequentialIds::with_prefix("copy"));

        prop_assert_eq!(remapped.mapping.len(), subtree.len());
        for new_id in remapped.mapping.values() {
            prop_assert!(!subtree.contains_key(new_id));
            prop_assert!(remapped.blocks.contains_key(new_id));
        }
        for block in remapped.blocks.values() {
            for child in block.child_ids() {
                let internal = remapped.blocks.contains_key(&child);
                let foreign = !subtree.contains_key(&child) && doc.contains(child.as_str());
                prop_assert!(internal || foreign, "dangling child {}", child);
            }
        }
    }
}
