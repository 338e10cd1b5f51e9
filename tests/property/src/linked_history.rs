use ledger_kernel::{
    Address, Blog, BlogInstruction, Instruction, KernelError, LedgerConfig, Post, PostKeying,
};
use proptest::prelude::*;

mod support;

fn create_post(blog: Address, post: Address, authority: Address, title: &str) -> Instruction {
    Instruction::Blog(BlogInstruction::CreatePost {
        blog,
        post,
        authority,
        title: title.to_owned(),
        content: format!("content of {title}"),
    })
}

/// Property: every append bumps the count by one and threads the back-pointer
#[test]
fn prop_append_threads_back_pointers() {
    proptest!(ProptestConfig::with_cases(32), |(
        owner in 1u64..10_000,
        titles in prop::collection::vec("[a-z]{1,40}", 1..6),
    )| {
        let mut ledger = support::ledger();
        let owner = support::identity(owner);
        let blog = ledger.deriver().blog(&owner).unwrap().address;
        support::send(
            &mut ledger,
            &[owner],
            vec![Instruction::Blog(BlogInstruction::InitBlog { blog, authority: owner })],
        )
        .unwrap();

        for title in &titles {
            let before: Blog = ledger.store().read_as(&blog).unwrap();
            let post = ledger.deriver().post_by_sequence(&blog, before.post_count).unwrap().address;
            support::send(&mut ledger, &[owner], vec![create_post(blog, post, owner, title)]).unwrap();

            let after: Blog = ledger.store().read_as(&blog).unwrap();
            let created: Post = ledger.store().read_as(&post).unwrap();
            prop_assert_eq!(after.post_count, before.post_count + 1);
            prop_assert_eq!(after.latest, post);
            prop_assert_eq!(created.previous, before.latest);
            prop_assert_eq!(created.sequence, before.post_count);
            prop_assert_eq!(&created.title, title);
        }
    });
}

/// Property: under title keying a repeated title prefix never creates a second post
#[test]
fn prop_title_keying_rejects_repeats() {
    proptest!(ProptestConfig::with_cases(32), |(
        owner in 1u64..10_000,
        titles in prop::collection::vec("[ab]{1,3}", 1..8),
    )| {
        let config = LedgerConfig { post_keying: PostKeying::Title, ..LedgerConfig::default() };
        let mut ledger = support::ledger_with(config);
        let owner = support::identity(owner);
        let blog = ledger.deriver().blog(&owner).unwrap().address;
        support::send(
            &mut ledger,
            &[owner],
            vec![Instruction::Blog(BlogInstruction::InitBlog { blog, authority: owner })],
        )
        .unwrap();

        let mut seen = std::collections::BTreeSet::new();
        for title in &titles {
            let post = ledger.deriver().post_by_title(&owner, title).unwrap().address;
            let result = support::send(&mut ledger, &[owner], vec![create_post(blog, post, owner, title)]);
            if seen.insert(title.clone()) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(KernelError::AlreadyExists(post)));
            }
        }

        let head: Blog = ledger.store().read_as(&blog).unwrap();
        prop_assert_eq!(head.post_count, seen.len() as u64);
    });
}
