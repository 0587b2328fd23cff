//! Integration tests for `SqliteStore` against an in-memory database.

use reel_core::{
  comment::NewComment,
  page::{PageRequest, SortDirection, VideoQuery, VideoSortKey},
  playlist::NewPlaylist,
  relation::{LikeTarget, ToggleState},
  store::MediaStore,
  tweet::NewTweet,
  user::NewUser,
  video::NewVideo,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(name: &str) -> NewUser {
  NewUser {
    username:        name.to_owned(),
    email:           format!("{name}@example.com"),
    full_name:       format!("{name} surname"),
    password_hash:   "$argon2id$stub".to_owned(),
    avatar_url:      format!("http://media.test/{name}.png"),
    cover_image_url: None,
  }
}

fn new_video(owner: Uuid, title: &str) -> NewVideo {
  NewVideo {
    owner_id:      owner,
    title:         title.to_owned(),
    description:   format!("about {title}"),
    video_url:     "http://media.test/clip.mp4".to_owned(),
    thumbnail_url: "http://media.test/thumb.jpg".to_owned(),
    duration_secs: 12.5,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;
  let user = s.create_user(new_user("alice")).await.unwrap();

  let by_name = s.find_login("alice").await.unwrap().unwrap();
  assert_eq!(by_name.user.user_id, user.user_id);

  let by_email = s.find_login("alice@example.com").await.unwrap().unwrap();
  assert_eq!(by_email.user.user_id, user.user_id);
  assert_eq!(by_email.password_hash, "$argon2id$stub");

  assert!(s.find_login("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  s.create_user(new_user("alice")).await.unwrap();

  let mut dup = new_user("alice");
  dup.email = "other@example.com".to_owned();
  assert!(s.create_user(dup).await.is_err());

  // The original row is untouched.
  assert!(s.find_login("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn refresh_token_roundtrip() {
  let s = store().await;
  let user = s.create_user(new_user("alice")).await.unwrap();

  s.set_refresh_token(user.user_id, Some("tok-1".into()))
    .await
    .unwrap();
  let rec = s.get_user_record(user.user_id).await.unwrap().unwrap();
  assert_eq!(rec.refresh_token.as_deref(), Some("tok-1"));

  s.set_refresh_token(user.user_id, None).await.unwrap();
  let rec = s.get_user_record(user.user_id).await.unwrap().unwrap();
  assert!(rec.refresh_token.is_none());
}

#[tokio::test]
async fn update_profile_images() {
  let s = store().await;
  let user = s.create_user(new_user("alice")).await.unwrap();

  let updated = s
    .update_avatar(user.user_id, "http://media.test/new.png".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.avatar_url, "http://media.test/new.png");

  let updated = s
    .update_cover_image(user.user_id, "http://media.test/cover.png".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.cover_image_url.as_deref(), Some("http://media.test/cover.png"));

  assert!(
    s.update_avatar(Uuid::new_v4(), "x".into())
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Toggles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn like_toggle_roundtrip() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  let first = s
    .toggle_like(alice.user_id, LikeTarget::Video, video.video_id)
    .await
    .unwrap();
  assert_eq!(first, ToggleState::On);
  assert_eq!(s.liked_videos(alice.user_id).await.unwrap().len(), 1);

  let second = s
    .toggle_like(alice.user_id, LikeTarget::Video, video.video_id)
    .await
    .unwrap();
  assert_eq!(second, ToggleState::Off);
  assert!(s.liked_videos(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn like_targets_are_independent() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();
  let tweet = s
    .create_tweet(NewTweet { owner_id: alice.user_id, content: "hi".into() })
    .await
    .unwrap();

  s.toggle_like(alice.user_id, LikeTarget::Video, video.video_id)
    .await
    .unwrap();
  s.toggle_like(alice.user_id, LikeTarget::Tweet, tweet.tweet_id)
    .await
    .unwrap();

  assert_eq!(s.liked_videos(alice.user_id).await.unwrap().len(), 1);
  assert_eq!(s.liked_tweets(alice.user_id).await.unwrap().len(), 1);

  s.toggle_like(alice.user_id, LikeTarget::Tweet, tweet.tweet_id)
    .await
    .unwrap();
  assert_eq!(s.liked_videos(alice.user_id).await.unwrap().len(), 1);
  assert!(s.liked_tweets(alice.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_toggles_never_duplicate_the_relation() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  // An odd number of flips from concurrent tasks must land on exactly one
  // row — never two — regardless of interleaving.
  let mut handles = Vec::new();
  for _ in 0..5 {
    let s = s.clone();
    let actor = alice.user_id;
    let target = video.video_id;
    handles.push(tokio::spawn(async move {
      s.toggle_like(actor, LikeTarget::Video, target).await.unwrap()
    }));
  }
  for h in handles {
    h.await.unwrap();
  }

  assert_eq!(s.liked_videos(alice.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn subscription_toggle_and_listings() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();

  let state = s
    .toggle_subscription(alice.user_id, bob.user_id)
    .await
    .unwrap();
  assert_eq!(state, ToggleState::On);

  let subscribers = s.channel_subscribers(bob.user_id).await.unwrap();
  assert_eq!(subscribers.len(), 1);
  assert_eq!(subscribers[0].profile.username, "alice");

  let channels = s.subscribed_channels(alice.user_id).await.unwrap();
  assert_eq!(channels.len(), 1);
  assert_eq!(channels[0].profile.username, "bob");

  let state = s
    .toggle_subscription(alice.user_id, bob.user_id)
    .await
    .unwrap();
  assert_eq!(state, ToggleState::Off);
  assert!(s.channel_subscribers(bob.user_id).await.unwrap().is_empty());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pages_do_not_overlap() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  for i in 0..25 {
    s.create_video(new_video(alice.user_id, &format!("video {i:02}")))
      .await
      .unwrap();
  }

  let query = |page| VideoQuery {
    page: PageRequest::new(page, 10).unwrap(),
    ..Default::default()
  };

  let p1 = s.list_videos(query(1)).await.unwrap();
  let p2 = s.list_videos(query(2)).await.unwrap();
  let p3 = s.list_videos(query(3)).await.unwrap();

  assert_eq!(p1.total, 25);
  assert_eq!(p1.total_pages, 3);
  assert!(p1.has_next && !p1.has_prev);
  assert!(p3.has_prev && !p3.has_next);
  assert_eq!((p1.items.len(), p2.items.len(), p3.items.len()), (10, 10, 5));

  let mut seen = std::collections::HashSet::new();
  for view in p1.items.iter().chain(&p2.items).chain(&p3.items) {
    assert!(seen.insert(view.video.video_id), "video repeated across pages");
  }
}

#[tokio::test]
async fn text_search_is_case_insensitive_substring() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  s.create_video(new_video(alice.user_id, "Cats at play")).await.unwrap();
  s.create_video(new_video(alice.user_id, "Dogs running")).await.unwrap();

  let page = s
    .list_videos(VideoQuery {
      text: Some("cats".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].video.title, "Cats at play");
}

#[tokio::test]
async fn text_search_escapes_wildcards() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  s.create_video(new_video(alice.user_id, "100% legit")).await.unwrap();
  s.create_video(new_video(alice.user_id, "100 percent")).await.unwrap();

  let page = s
    .list_videos(VideoQuery {
      text: Some("100%".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].video.title, "100% legit");
}

#[tokio::test]
async fn listing_filters_by_owner_and_sorts() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();

  s.create_video(new_video(alice.user_id, "b title")).await.unwrap();
  s.create_video(new_video(alice.user_id, "a title")).await.unwrap();
  s.create_video(new_video(bob.user_id, "c title")).await.unwrap();

  let page = s
    .list_videos(VideoQuery {
      owner_id: Some(alice.user_id),
      sort_key: VideoSortKey::Title,
      direction: SortDirection::Asc,
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(page.total, 2);
  let titles: Vec<_> = page.items.iter().map(|v| v.video.title.as_str()).collect();
  assert_eq!(titles, ["a title", "b title"]);
}

#[tokio::test]
async fn unpublished_videos_are_hidden_from_reads() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  let toggled = s.toggle_publish(video.video_id).await.unwrap().unwrap();
  assert!(!toggled.is_published);

  assert!(s.get_video_with_owner(video.video_id).await.unwrap().is_none());
  let page = s.list_videos(VideoQuery::default()).await.unwrap();
  assert_eq!(page.total, 0);

  // The owner still sees it through the unfiltered read.
  assert!(s.get_video(video.video_id).await.unwrap().is_some());

  let toggled = s.toggle_publish(video.video_id).await.unwrap().unwrap();
  assert!(toggled.is_published);
  assert!(s.get_video_with_owner(video.video_id).await.unwrap().is_some());
}

#[tokio::test]
async fn listing_joins_owner_profile() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  let page = s.list_videos(VideoQuery::default()).await.unwrap();
  assert_eq!(page.items[0].owner.username, "alice");
  assert_eq!(page.items[0].owner.user_id, alice.user_id);
}

// ─── Views & watch history ───────────────────────────────────────────────────

#[tokio::test]
async fn view_counting_is_idempotent_per_user() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  let (v, counted) = s
    .record_view(bob.user_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert!(counted);
  assert_eq!(v.views, 1);

  let (v, counted) = s
    .record_view(bob.user_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert!(!counted);
  assert_eq!(v.views, 1);

  // A different viewer still counts.
  let (v, counted) = s
    .record_view(alice.user_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert!(counted);
  assert_eq!(v.views, 2);

  assert!(
    s.record_view(bob.user_id, Uuid::new_v4())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn watch_history_is_most_recent_first() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();
  let v1 = s.create_video(new_video(alice.user_id, "first")).await.unwrap();
  let v2 = s.create_video(new_video(alice.user_id, "second")).await.unwrap();

  s.record_view(bob.user_id, v1.video_id).await.unwrap();
  s.record_view(bob.user_id, v2.video_id).await.unwrap();

  let history = s.watch_history(bob.user_id).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].view.video.video_id, v2.video_id);
  assert_eq!(history[1].view.video.video_id, v1.video_id);
  assert_eq!(history[0].view.owner.username, "alice");
}

// ─── Channel aggregates ──────────────────────────────────────────────────────

#[tokio::test]
async fn channel_stats_default_to_zero() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();

  let stats = s.channel_stats(alice.user_id).await.unwrap();
  assert_eq!(stats.total_likes, 0);
  assert_eq!(stats.total_subscribers, 0);
  assert_eq!(stats.total_videos, 0);
  assert_eq!(stats.total_views, 0);
}

#[tokio::test]
async fn channel_stats_aggregate() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();

  let v1 = s.create_video(new_video(alice.user_id, "one")).await.unwrap();
  let v2 = s.create_video(new_video(alice.user_id, "two")).await.unwrap();
  s.record_view(bob.user_id, v1.video_id).await.unwrap();
  s.record_view(bob.user_id, v2.video_id).await.unwrap();
  s.toggle_subscription(bob.user_id, alice.user_id).await.unwrap();
  s.toggle_like(alice.user_id, LikeTarget::Video, v1.video_id)
    .await
    .unwrap();

  let stats = s.channel_stats(alice.user_id).await.unwrap();
  assert_eq!(stats.total_likes, 1);
  assert_eq!(stats.total_subscribers, 1);
  assert_eq!(stats.total_videos, 2);
  assert_eq!(stats.total_views, 2);
}

#[tokio::test]
async fn channel_profile_counts_and_viewer_state() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();
  let carol = s.create_user(new_user("carol")).await.unwrap();

  s.toggle_subscription(bob.user_id, alice.user_id).await.unwrap();
  s.toggle_subscription(carol.user_id, alice.user_id).await.unwrap();
  s.toggle_subscription(alice.user_id, bob.user_id).await.unwrap();

  let profile = s
    .channel_profile("alice", bob.user_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(profile.subscriber_count, 2);
  assert_eq!(profile.subscribed_to_count, 1);
  assert!(profile.is_subscribed);

  let profile = s
    .channel_profile("bob", carol.user_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(profile.subscriber_count, 1);
  assert!(!profile.is_subscribed);

  assert!(s.channel_profile("ghost", bob.user_id).await.unwrap().is_none());
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_crud_and_pagination() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  for i in 0..12 {
    s.create_comment(NewComment {
      video_id: video.video_id,
      owner_id: alice.user_id,
      content:  format!("comment {i}"),
    })
    .await
    .unwrap();
  }

  let p1 = s
    .comments_for_video(video.video_id, PageRequest::new(1, 10).unwrap())
    .await
    .unwrap();
  let p2 = s
    .comments_for_video(video.video_id, PageRequest::new(2, 10).unwrap())
    .await
    .unwrap();
  assert_eq!(p1.total, 12);
  assert_eq!(p1.items.len(), 10);
  assert_eq!(p2.items.len(), 2);
  assert_eq!(p1.items[0].owner.username, "alice");

  let target = p1.items[0].comment.comment_id;
  let updated = s
    .update_comment(target, "edited".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.content, "edited");

  assert!(s.delete_comment(target).await.unwrap());
  assert!(s.get_comment(target).await.unwrap().is_none());
  assert!(!s.delete_comment(target).await.unwrap());
}

// ─── Tweets ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tweet_crud() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();

  let tweet = s
    .create_tweet(NewTweet { owner_id: alice.user_id, content: "hello".into() })
    .await
    .unwrap();

  let listed = s.tweets_by_user(alice.user_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].owner.username, "alice");

  let updated = s
    .update_tweet(tweet.tweet_id, "hello again".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.content, "hello again");

  assert!(s.delete_tweet(tweet.tweet_id).await.unwrap());
  assert!(s.get_tweet(tweet.tweet_id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_tweet_clears_its_likes() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let tweet = s
    .create_tweet(NewTweet { owner_id: alice.user_id, content: "hi".into() })
    .await
    .unwrap();

  s.toggle_like(alice.user_id, LikeTarget::Tweet, tweet.tweet_id)
    .await
    .unwrap();
  s.delete_tweet(tweet.tweet_id).await.unwrap();

  assert!(s.liked_tweets(alice.user_id).await.unwrap().is_empty());
}

// ─── Playlists ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn playlist_membership_roundtrip() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();
  let playlist = s
    .create_playlist(NewPlaylist {
      owner_id:    alice.user_id,
      name:        "favs".into(),
      description: "favorites".into(),
    })
    .await
    .unwrap();

  let view = s
    .add_playlist_video(playlist.playlist_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(view.videos.len(), 1);

  // Adding again is a no-op, not a duplicate.
  let view = s
    .add_playlist_video(playlist.playlist_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(view.videos.len(), 1);

  let view = s
    .remove_playlist_video(playlist.playlist_id, video.video_id)
    .await
    .unwrap()
    .unwrap();
  assert!(view.videos.is_empty());

  assert!(
    s.add_playlist_video(Uuid::new_v4(), video.video_id)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn playlist_update_and_delete() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let playlist = s
    .create_playlist(NewPlaylist {
      owner_id:    alice.user_id,
      name:        "favs".into(),
      description: "favorites".into(),
    })
    .await
    .unwrap();

  let updated = s
    .update_playlist(playlist.playlist_id, "new name".into(), "new desc".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "new name");

  assert_eq!(s.playlists_by_owner(alice.user_id).await.unwrap().len(), 1);
  assert!(s.delete_playlist(playlist.playlist_id).await.unwrap());
  assert!(s.playlists_by_owner(alice.user_id).await.unwrap().is_empty());
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_a_video_cascades() {
  let s = store().await;
  let alice = s.create_user(new_user("alice")).await.unwrap();
  let bob   = s.create_user(new_user("bob")).await.unwrap();
  let video = s.create_video(new_video(alice.user_id, "clip")).await.unwrap();

  let comment = s
    .create_comment(NewComment {
      video_id: video.video_id,
      owner_id: bob.user_id,
      content:  "nice".into(),
    })
    .await
    .unwrap();

  let playlist = s
    .create_playlist(NewPlaylist {
      owner_id:    bob.user_id,
      name:        "watchlist".into(),
      description: "later".into(),
    })
    .await
    .unwrap();
  s.add_playlist_video(playlist.playlist_id, video.video_id)
    .await
    .unwrap();

  s.toggle_like(bob.user_id, LikeTarget::Video, video.video_id)
    .await
    .unwrap();
  s.toggle_like(bob.user_id, LikeTarget::Comment, comment.comment_id)
    .await
    .unwrap();
  s.record_view(bob.user_id, video.video_id).await.unwrap();

  assert!(s.delete_video(video.video_id).await.unwrap());

  assert!(s.get_video(video.video_id).await.unwrap().is_none());
  assert!(s.get_comment(comment.comment_id).await.unwrap().is_none());
  assert!(s.liked_videos(bob.user_id).await.unwrap().is_empty());
  assert!(s.watch_history(bob.user_id).await.unwrap().is_empty());

  let view = s
    .get_playlist_view(playlist.playlist_id)
    .await
    .unwrap()
    .unwrap();
  assert!(view.videos.is_empty());

  assert!(!s.delete_video(video.video_id).await.unwrap());
}
