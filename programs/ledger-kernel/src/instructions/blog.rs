// Blog program: a blog head record plus an append-only chain of posts
//
// Post addresses follow the keying scheme stamped on the blog at creation:
// by title prefix under the owner (duplicate titles collide) or by the blog's
// post count (never collides, but the caller must know the count).

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::info;

use crate::address::Address;
use crate::deriver::{check_address, ProgramAddress};
use crate::errors::Result;
use crate::guards::{authorize, Authority};
use crate::processor::InvokeContext;
use crate::state::{AccountMeta, Blog, Post, PostKeying, StoreTransaction};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum BlogInstruction {
    InitBlog {
        blog: Address,
        authority: Address,
    },
    CreatePost {
        blog: Address,
        post: Address,
        authority: Address,
        title: String,
        content: String,
    },
}

impl BlogInstruction {
    pub fn accounts(&self) -> Vec<AccountMeta> {
        match self {
            Self::InitBlog { blog, authority } => vec![
                AccountMeta::new(*blog, false),
                AccountMeta::new(*authority, true),
            ],
            Self::CreatePost { blog, post, authority, .. } => vec![
                AccountMeta::new(*blog, false),
                AccountMeta::new(*post, false),
                AccountMeta::new(*authority, true),
            ],
        }
    }
}

pub fn process(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    instruction: &BlogInstruction,
) -> Result<()> {
    match instruction {
        BlogInstruction::InitBlog { blog, authority } => init_blog(ctx, tx, blog, authority),
        BlogInstruction::CreatePost { blog, post, authority, title, content } => {
            create_post(ctx, tx, blog, post, authority, title, content)
        }
    }
}

fn init_blog(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    blog: &Address,
    authority: &Address,
) -> Result<()> {
    ctx.signers().require(authority)?;
    check_address(&ctx.deriver().blog(authority)?, blog)?;

    let keying = ctx.config().post_keying;
    tx.create(
        ctx.program_id(),
        blog,
        Blog {
            authority: *authority,
            keying,
            latest: Address::NONE,
            post_count: 0,
        },
    )?;
    info!(blog = %blog, authority = %authority, ?keying, "blog initialized");
    Ok(())
}

/// Address the blog's next post must live at
pub fn next_post_address(
    ctx: &InvokeContext<'_>,
    blog_address: &Address,
    blog: &Blog,
    title: &str,
) -> Result<ProgramAddress> {
    match blog.keying {
        PostKeying::Title => ctx.deriver().post_by_title(&blog.authority, title),
        PostKeying::Sequence => ctx.deriver().post_by_sequence(blog_address, blog.post_count),
    }
}

fn create_post(
    ctx: &InvokeContext<'_>,
    tx: &mut StoreTransaction<'_>,
    blog_address: &Address,
    post_address: &Address,
    authority: &Address,
    title: &str,
    content: &str,
) -> Result<()> {
    let blog: Blog = tx.read_as(blog_address)?;
    check_address(&ctx.deriver().blog(&blog.authority)?, blog_address)?;
    let signer = ctx.signers().require(authority)?;
    authorize(&blog.authority, &Authority::Direct(signer))?;
    check_address(&next_post_address(ctx, blog_address, &blog, title)?, post_address)?;

    let post = Post {
        authority: blog.authority,
        blog: *blog_address,
        title: title.to_owned(),
        content: content.to_owned(),
        timestamp: ctx.clock().unix_timestamp,
        previous: Address::NONE,
        sequence: 0,
    };
    let post = tx.append_linked::<Blog, Post>(ctx.program_id(), blog_address, post_address, post)?;
    info!(
        blog = %blog_address,
        post = %post_address,
        previous = %post.previous,
        sequence = post.sequence,
        "post appended"
    );
    Ok(())
}
