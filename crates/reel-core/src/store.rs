//! The `MediaStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `reel-store-sqlite`).
//! The HTTP layer (`reel-api`) depends on this abstraction, not on any
//! concrete backend.
//!
//! Division of labor: reads return `Option` and the caller decides what a
//! miss means; ownership comparison happens in the caller with the entity
//! in hand. The two operations with a real read-then-write hazard — the
//! relation toggles and view counting — are single store operations and
//! must be atomic in the backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  comment::{Comment, CommentView, NewComment},
  page::{Page, PageRequest, VideoQuery},
  playlist::{NewPlaylist, Playlist, PlaylistView},
  relation::{LikeTarget, SubscriptionEntry, ToggleState},
  tweet::{NewTweet, Tweet, TweetView},
  user::{ChannelProfile, ChannelStats, NewUser, User, UserRecord},
  video::{NewVideo, Video, VideoView, WatchEntry},
};

/// Abstraction over a Reel storage backend.
pub trait MediaStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. The backend enforces username and
  /// email uniqueness; callers should check with [`Self::find_login`]
  /// first to report a clean conflict.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id, without credential fields.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve the full record (credentials included) for a user whose
  /// username OR email equals `identity`.
  fn find_login<'a>(
    &'a self,
    identity: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a;

  /// Retrieve the full record (credentials included) by id.
  fn get_user_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  /// Replace the stored refresh token. `None` clears it (logout).
  fn set_refresh_token(
    &self,
    id: Uuid,
    token: Option<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_password_hash(
    &self,
    id: Uuid,
    password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Swap the avatar URL, returning the updated user.
  fn update_avatar(
    &self,
    id: Uuid,
    avatar_url: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Swap the cover-image URL, returning the updated user.
  fn update_cover_image(
    &self,
    id: Uuid,
    cover_image_url: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// A channel page for `username`, with subscription aggregates computed
  /// relative to `viewer`.
  fn channel_profile<'a>(
    &'a self,
    username: &'a str,
    viewer: Uuid,
  ) -> impl Future<Output = Result<Option<ChannelProfile>, Self::Error>> + Send + 'a;

  /// The viewer's watch history, most recently watched first.
  fn watch_history(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<WatchEntry>, Self::Error>> + Send + '_;

  /// Record that `user_id` watched `video_id`. The first time a given user
  /// watches a given video the view counter increments; repeats leave the
  /// counter untouched. Returns the (possibly updated) video and whether
  /// this call counted, or `None` if the video does not exist. Atomic.
  fn record_view(
    &self,
    user_id: Uuid,
    video_id: Uuid,
  ) -> impl Future<Output = Result<Option<(Video, bool)>, Self::Error>> + Send + '_;

  // ── Videos ────────────────────────────────────────────────────────────

  fn create_video(
    &self,
    input: NewVideo,
  ) -> impl Future<Output = Result<Video, Self::Error>> + Send + '_;

  /// Retrieve a video by id regardless of publication state.
  fn get_video(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  /// Retrieve a published video joined with its owner's profile.
  fn get_video_with_owner(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<VideoView>, Self::Error>> + Send + '_;

  /// Paginated, owner-joined listing of published videos. See
  /// [`VideoQuery`] for the filter/sort/page contract.
  fn list_videos(
    &self,
    query: VideoQuery,
  ) -> impl Future<Output = Result<Page<VideoView>, Self::Error>> + Send + '_;

  fn update_video_details(
    &self,
    id: Uuid,
    title: String,
    description: String,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  fn update_video_thumbnail(
    &self,
    id: Uuid,
    thumbnail_url: String,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  /// Flip the publication flag, returning the updated video.
  fn toggle_publish(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  /// Delete a video and everything hanging off it (comments, like rows,
  /// playlist memberships, watch-history rows) in one transaction.
  /// Returns `false` if the video did not exist.
  fn delete_video(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All of one owner's videos, published or not, newest first.
  fn videos_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Video>, Self::Error>> + Send + '_;

  /// Dashboard aggregates for a channel.
  fn channel_stats(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<ChannelStats, Self::Error>> + Send + '_;

  // ── Relation toggles ──────────────────────────────────────────────────

  /// Flip the like relation for `(actor, target_kind, target)`. Atomic:
  /// concurrent calls can never leave two rows for one tuple.
  fn toggle_like(
    &self,
    actor_id: Uuid,
    target_kind: LikeTarget,
    target_id: Uuid,
  ) -> impl Future<Output = Result<ToggleState, Self::Error>> + Send + '_;

  /// Flip the subscription relation for `(subscriber, channel)`. Atomic.
  fn toggle_subscription(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> impl Future<Output = Result<ToggleState, Self::Error>> + Send + '_;

  /// Published videos the actor has liked, owner-joined, newest like first.
  fn liked_videos(
    &self,
    actor_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VideoView>, Self::Error>> + Send + '_;

  /// Tweets the actor has liked, owner-joined, newest like first.
  fn liked_tweets(
    &self,
    actor_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TweetView>, Self::Error>> + Send + '_;

  /// Profiles subscribed to `channel_id`, newest subscription first.
  fn channel_subscribers(
    &self,
    channel_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SubscriptionEntry>, Self::Error>> + Send + '_;

  /// Channels `subscriber_id` subscribes to, newest subscription first.
  fn subscribed_channels(
    &self,
    subscriber_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SubscriptionEntry>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Paginated, author-joined comments for one video, newest first.
  fn comments_for_video(
    &self,
    video_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<CommentView>, Self::Error>> + Send + '_;

  fn update_comment(
    &self,
    id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Delete a comment and its like rows. Returns `false` if absent.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Tweets ────────────────────────────────────────────────────────────

  fn create_tweet(
    &self,
    input: NewTweet,
  ) -> impl Future<Output = Result<Tweet, Self::Error>> + Send + '_;

  fn get_tweet(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Tweet>, Self::Error>> + Send + '_;

  /// One user's tweets, author-joined, newest first.
  fn tweets_by_user(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<TweetView>, Self::Error>> + Send + '_;

  fn update_tweet(
    &self,
    id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Option<Tweet>, Self::Error>> + Send + '_;

  /// Delete a tweet and its like rows. Returns `false` if absent.
  fn delete_tweet(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Playlists ─────────────────────────────────────────────────────────

  fn create_playlist(
    &self,
    input: NewPlaylist,
  ) -> impl Future<Output = Result<Playlist, Self::Error>> + Send + '_;

  fn get_playlist(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Playlist>, Self::Error>> + Send + '_;

  /// A playlist with its member videos materialised, insertion order.
  fn get_playlist_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PlaylistView>, Self::Error>> + Send + '_;

  fn playlists_by_owner(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PlaylistView>, Self::Error>> + Send + '_;

  fn update_playlist(
    &self,
    id: Uuid,
    name: String,
    description: String,
  ) -> impl Future<Output = Result<Option<Playlist>, Self::Error>> + Send + '_;

  fn delete_playlist(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Add a video to a playlist (no-op if already a member) and return the
  /// refreshed view. `None` if the playlist does not exist.
  fn add_playlist_video(
    &self,
    playlist_id: Uuid,
    video_id: Uuid,
  ) -> impl Future<Output = Result<Option<PlaylistView>, Self::Error>> + Send + '_;

  /// Remove a video from a playlist (no-op if not a member) and return the
  /// refreshed view. `None` if the playlist does not exist.
  fn remove_playlist_video(
    &self,
    playlist_id: Uuid,
    video_id: Uuid,
  ) -> impl Future<Output = Result<Option<PlaylistView>, Self::Error>> + Send + '_;
}
