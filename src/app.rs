//! Main application component for StoryNest

use crate::assets::Icon;
use crate::audio::{PipeWireMicrophone, PipeWireOutput, PlaybackState};
use crate::models::{voice_by_value, Story, StoryIdea, VOICE_OPTIONS};
use crate::services::{
    or_interrupted, GeminiClient, IdeaService, SpeechService, StoryService,
};
use crate::settings::Settings;
use crate::state::{
    IdeaBoard, IdeaFetch, NarrationPanel, Navigator, SpeechTicket, StoryForm, StoryPlayer, View,
};
use crate::tokio_runtime;
use gpui::prelude::*;
use gpui::{InteractiveElement, *};
use gpui_component::input::{Input, InputState};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Inputs and model of the custom story screen
struct CreatorScreen {
    form: StoryForm,
    child_name: Entity<InputState>,
    character: Entity<InputState>,
    theme: Entity<InputState>,
}

impl CreatorScreen {
    fn new(window: &mut Window, cx: &mut Context<StoryNest>) -> Self {
        Self {
            form: StoryForm::new(),
            child_name: cx.new(|cx| InputState::new(window, cx).placeholder("e.g., Lily")),
            character: cx.new(|cx| {
                InputState::new(window, cx).placeholder("e.g., a brave little firefly")
            }),
            theme: cx.new(|cx| {
                InputState::new(window, cx).placeholder("e.g., finding a hidden treasure")
            }),
        }
    }

    /// Copy the input texts into the form
    fn sync(&mut self, cx: &App) {
        self.form
            .set_child_name(self.child_name.read(cx).value().to_string());
        self.form
            .set_character(self.character.read(cx).value().to_string());
        self.form.set_theme(self.theme.read(cx).value().to_string());
    }
}

/// The root application view
pub struct StoryNest {
    ideas: Arc<dyn IdeaService>,
    stories: Arc<dyn StoryService>,
    speech: Arc<dyn SpeechService>,
    navigator: Navigator,
    board: IdeaBoard,
    creator: Option<CreatorScreen>,
    /// Present exactly while the Playing view is shown
    player: Option<StoryPlayer>,
    _ui_refresh_task: Option<Task<()>>,
}

impl StoryNest {
    pub fn new(settings: Settings, cx: &mut Context<Self>) -> Self {
        let client = Arc::new(GeminiClient::new(settings.gemini));

        let mut app = Self {
            ideas: client.clone(),
            stories: client.clone(),
            speech: client,
            navigator: Navigator::new(),
            board: IdeaBoard::new(),
            creator: None,
            player: None,
            _ui_refresh_task: None,
        };
        app.load_ideas(IdeaFetch::Refresh, cx);
        app
    }

    /// Set up whatever the current view needs after a transition
    fn enter_view(&mut self, cx: &mut Context<Self>) {
        match self.navigator.view() {
            View::Home => {
                self.player = None;
                self.creator = None;
                self._ui_refresh_task = None;
                self.load_ideas(IdeaFetch::Refresh, cx);
            }
            View::Playing(story) => {
                let story = story.clone();
                self.creator = None;
                self.open_player(story, cx);
            }
            View::Creating | View::Loading { .. } => {}
        }
        cx.notify();
    }

    fn load_ideas(&mut self, kind: IdeaFetch, cx: &mut Context<Self>) {
        let Some(tag) = self.board.begin(kind) else {
            return;
        };

        let service = self.ideas.clone();
        let request = tokio_runtime::spawn(cx, async move { service.generate_ideas().await });

        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = or_interrupted(request.await);
            let Some(this) = this.upgrade() else {
                return;
            };
            let _ = cx.update_entity(&this, |this, cx| {
                this.board.finish(tag, result);
                cx.notify();
            });
        })
        .detach();
        cx.notify();
    }

    fn select_idea(&mut self, idea: StoryIdea, cx: &mut Context<Self>) {
        let Some(tag) = self.navigator.select_idea(idea.clone()) else {
            return;
        };
        self.board.cancel();

        let service = self.stories.clone();
        let request = tokio_runtime::spawn(cx, async move {
            service.story_from_idea(&idea.title, &idea.premise).await
        });

        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = or_interrupted(request.await);
            let Some(this) = this.upgrade() else {
                return;
            };
            let _ = cx.update_entity(&this, |this, cx| {
                if this.navigator.finish_loading(tag, result) {
                    this.enter_view(cx);
                }
            });
        })
        .detach();
        cx.notify();
    }

    fn start_creating(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.navigator.start_creating() {
            self.board.cancel();
            self.creator = Some(CreatorScreen::new(window, cx));
            cx.notify();
        }
    }

    fn submit_story(&mut self, cx: &mut Context<Self>) {
        let Some(creator) = self.creator.as_mut() else {
            return;
        };
        creator.sync(cx);

        let submission = match creator.form.begin_submit() {
            Ok(Some(submission)) => submission,
            Ok(None) => return,
            Err(e) => {
                debug!("Story form rejected: {}", e);
                cx.notify();
                return;
            }
        };

        let service = self.stories.clone();
        let request = submission.request;
        let task = tokio_runtime::spawn(cx, async move { service.custom_story(&request).await });
        let tag = submission.tag;

        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = or_interrupted(task.await);
            let Some(this) = this.upgrade() else {
                return;
            };
            let _ = cx.update_entity(&this, |this, cx| {
                let story = this
                    .creator
                    .as_mut()
                    .and_then(|creator| creator.form.finish_submit(tag, result));
                if let Some(story) = story {
                    if this.navigator.story_created(story) {
                        this.enter_view(cx);
                    }
                }
            });
        })
        .detach();
        cx.notify();
    }

    fn back(&mut self, cx: &mut Context<Self>) {
        if let Some(creator) = self.creator.as_mut() {
            creator.form.cancel();
        }
        if self.navigator.back() {
            self.enter_view(cx);
        }
    }

    fn open_player(&mut self, story: Story, cx: &mut Context<Self>) {
        self.player = Some(StoryPlayer::new(
            story,
            Box::new(PipeWireOutput::new()),
            Box::new(PipeWireMicrophone::new()),
        ));
        self.start_ui_refresh(cx);
    }

    /// Poll the player while it is shown, redrawing when it is busy or changed
    fn start_ui_refresh(&mut self, cx: &mut Context<Self>) {
        self._ui_refresh_task = Some(cx.spawn({
            async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
                loop {
                    // Wait ~60fps refresh rate
                    cx.background_executor()
                        .timer(Duration::from_millis(16))
                        .await;

                    let Some(this) = this.upgrade() else {
                        break;
                    };

                    let should_continue = cx.update_entity(&this, |this, cx| {
                        let Some(player) = this.player.as_mut() else {
                            return false;
                        };
                        let before = (player.playback_state(), player.capture_state());
                        player.refresh();
                        let after = (player.playback_state(), player.capture_state());

                        let busy = after.0 == PlaybackState::Playing || player.is_recording();
                        if busy || before != after {
                            cx.notify();
                        }
                        true
                    });

                    match should_continue {
                        Ok(true) => continue,
                        _ => break,
                    }
                }
            }
        }));
    }

    fn select_voice(&mut self, voice: &'static str, cx: &mut Context<Self>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let SpeechTicket { tag, text, voice } = player.select_voice(voice);

        let service = self.speech.clone();
        let request = tokio_runtime::spawn(cx, async move { service.synthesize(&text, voice).await });

        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = or_interrupted(request.await);
            let Some(this) = this.upgrade() else {
                return;
            };
            let _ = cx.update_entity(&this, |this, cx| {
                if let Some(player) = this.player.as_mut() {
                    player.finish_speech(tag, result);
                }
                cx.notify();
            });
        })
        .detach();
        cx.notify();
    }

    fn with_player(&mut self, cx: &mut Context<Self>, f: impl FnOnce(&mut StoryPlayer)) {
        if let Some(player) = self.player.as_mut() {
            f(player);
            cx.notify();
        }
    }

    fn quit(&mut self, window: &mut Window) {
        // Release audio devices before the window goes away
        self._ui_refresh_task = None;
        self.player = None;
        window.remove_window();
    }
}

impl Render for StoryNest {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let content = match self.navigator.view() {
            View::Home => self.render_home(cx).into_any_element(),
            View::Creating => self.render_creator(cx).into_any_element(),
            View::Loading { idea, .. } => render_loading(idea).into_any_element(),
            View::Playing(_) => self.render_player(cx).into_any_element(),
        };

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(rgb(0x0f0f1a))
            .key_context("StoryNest")
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                match event.keystroke.key.as_str() {
                    "escape" => this.back(cx),
                    "space" if this.player.is_some() && this.creator.is_none() => {
                        this.with_player(cx, |player| {
                            player.toggle_playback();
                        });
                    }
                    "q" if event.keystroke.modifiers.control => this.quit(window),
                    _ => {}
                }
            }))
            // Custom titlebar
            .child(
                div()
                    .id("titlebar")
                    .flex()
                    .items_center()
                    .justify_between()
                    .w_full()
                    .h(px(36.0))
                    .bg(rgb(0x12121f))
                    .border_b_1()
                    .border_color(rgb(0x2d2d44))
                    .child(
                        div()
                            .id("titlebar-drag-area")
                            .flex()
                            .flex_grow()
                            .items_center()
                            .h_full()
                            .gap_2()
                            .px_4()
                            .on_mouse_down(
                                MouseButton::Left,
                                cx.listener(|_this, _event: &MouseDownEvent, window, _cx| {
                                    window.start_window_move();
                                }),
                            )
                            .child(icon(Icon::BookOpen, 16.0, 0xe94560))
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .text_color(rgb(0xcccccc))
                                    .child("StoryNest"),
                            ),
                    )
                    .child(
                        div()
                            .id("close-button")
                            .w(px(46.0))
                            .h(px(36.0))
                            .flex()
                            .items_center()
                            .justify_center()
                            .cursor_pointer()
                            .hover(|style| style.bg(rgb(0xe81123)))
                            .on_click(cx.listener(|this, _, window, _cx| this.quit(window)))
                            .child(div().text_lg().text_color(rgb(0xcccccc)).child("×")),
                    ),
            )
            .child(
                div()
                    .id("content-scroll")
                    .flex()
                    .flex_col()
                    .items_center()
                    .flex_grow()
                    .overflow_y_scroll()
                    .bg(rgb(0x16213e))
                    .child(content),
            )
    }
}

impl StoryNest {
    fn render_home(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let is_refreshing = self.board.is_refreshing();
        let is_appending = self.board.is_appending();
        let is_busy = self.board.is_busy();
        let error = self.board.error();

        div()
            .flex()
            .flex_col()
            .items_center()
            .w_full()
            .max_w(px(960.0))
            .p_8()
            .gap_6()
            .child(
                div()
                    .flex()
                    .gap_3()
                    .text_3xl()
                    .font_weight(FontWeight::BOLD)
                    .child(div().text_color(rgb(0xffffff)).child("Welcome to"))
                    .child(div().text_color(rgb(0xe94560)).child("StoryNest")),
            )
            .child(
                div()
                    .text_color(rgb(0x888888))
                    .child("Your magical corner for wonderful bedtime stories. Create your own or discover a new adventure below."),
            )
            .child(
                div()
                    .id("create-story")
                    .flex()
                    .items_center()
                    .gap_3()
                    .px_8()
                    .py_4()
                    .rounded_full()
                    .bg(rgb(0xe94560))
                    .cursor_pointer()
                    .hover(|style| style.bg(rgb(0xd63d56)))
                    .on_click(cx.listener(|this, _, window, cx| this.start_creating(window, cx)))
                    .child(icon(Icon::MagicWand, 20.0, 0xffffff))
                    .child(
                        div()
                            .font_weight(FontWeight::BOLD)
                            .text_color(rgb(0xffffff))
                            .child("Create a Custom Story"),
                    ),
            )
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_between()
                    .w_full()
                    .mt_4()
                    .child(
                        div()
                            .text_2xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(rgb(0xffffff))
                            .child("Discover a Story"),
                    )
                    .child(
                        div()
                            .id("refresh-ideas")
                            .p_2()
                            .rounded_full()
                            .when(!is_busy, |el| {
                                el.cursor_pointer()
                                    .hover(|style| style.bg(rgb(0x2d2d44)))
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.load_ideas(IdeaFetch::Refresh, cx)
                                    }))
                            })
                            .child(icon(
                                Icon::Refresh,
                                20.0,
                                if is_busy { 0x444444 } else { 0xa78bfa },
                            )),
                    ),
            )
            .when_some(error, |el, message| {
                el.child(div().text_color(rgb(0xef4444)).child(message))
            })
            .child(
                div()
                    .flex()
                    .flex_wrap()
                    .justify_center()
                    .gap_4()
                    .w_full()
                    .when(is_refreshing, |el| {
                        el.children((0..6).map(|_| skeleton_card()))
                    })
                    .when(!is_refreshing, |el| {
                        el.children(self.board.ideas().iter().enumerate().map(|(i, idea)| {
                            let selected = idea.clone();
                            idea_card(i, idea).on_click(cx.listener(move |this, _, _window, cx| {
                                this.select_idea(selected.clone(), cx)
                            }))
                        }))
                    }),
            )
            .when(!is_refreshing, |el| {
                el.child(
                    div()
                        .id("load-more")
                        .flex()
                        .items_center()
                        .gap_2()
                        .px_6()
                        .py_3()
                        .rounded_full()
                        .bg(rgb(if is_appending { 0x444444 } else { 0x7c3aed }))
                        .when(!is_appending, |el| {
                            el.cursor_pointer()
                                .hover(|style| style.bg(rgb(0x6d28d9)))
                                .on_click(cx.listener(|this, _, _window, cx| {
                                    this.load_ideas(IdeaFetch::LoadMore, cx)
                                }))
                        })
                        .when(!is_appending, |el| el.child(icon(Icon::Plus, 18.0, 0xffffff)))
                        .child(
                            div()
                                .font_weight(FontWeight::BOLD)
                                .text_color(rgb(0xffffff))
                                .child(if is_appending {
                                    "Loading..."
                                } else {
                                    "Load More Stories"
                                }),
                        ),
                )
            })
    }

    fn render_creator(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let Some(creator) = self.creator.as_ref() else {
            return div();
        };
        let is_submitting = creator.form.is_submitting();
        let error = creator.form.error().map(|e| e.to_string());

        div()
            .flex()
            .flex_col()
            .w_full()
            .max_w(px(560.0))
            .p_8()
            .gap_6()
            .child(back_button(cx))
            .child(
                div()
                    .flex()
                    .flex_col()
                    .gap_4()
                    .p_8()
                    .rounded_lg()
                    .bg(rgb(0x1a1a2e))
                    .border_1()
                    .border_color(rgb(0x2d2d44))
                    .child(
                        div()
                            .text_2xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(rgb(0xffffff))
                            .child("Create a Magical Story"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(rgb(0x888888))
                            .child("Add your own ingredients for a unique tale!"),
                    )
                    .child(form_field("Child's Name:", &creator.child_name))
                    .child(form_field("Main Character:", &creator.character))
                    .child(form_field("Story About:", &creator.theme))
                    .when_some(error, |el, message| {
                        el.child(div().text_sm().text_color(rgb(0xef4444)).child(message))
                    })
                    .child(
                        div()
                            .id("submit-story")
                            .flex()
                            .justify_center()
                            .py_3()
                            .rounded_full()
                            .bg(rgb(if is_submitting { 0x444444 } else { 0xe94560 }))
                            .when(!is_submitting, |el| {
                                el.cursor_pointer()
                                    .hover(|style| style.bg(rgb(0xd63d56)))
                                    .on_click(cx.listener(|this, _, _window, cx| {
                                        this.submit_story(cx)
                                    }))
                            })
                            .child(
                                div()
                                    .font_weight(FontWeight::BOLD)
                                    .text_color(rgb(0xffffff))
                                    .child(if is_submitting {
                                        "Weaving magic..."
                                    } else {
                                        "Create Story!"
                                    }),
                            ),
                    ),
            )
    }

    fn render_player(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let Some(player) = self.player.as_ref() else {
            return div();
        };
        let story = player.story();
        let is_playing = player.playback_state() == PlaybackState::Playing;
        let panel = player.panel();

        div()
            .flex()
            .flex_col()
            .w_full()
            .max_w(px(720.0))
            .p_8()
            .gap_6()
            .child(back_button(cx))
            .child(
                div()
                    .text_3xl()
                    .font_weight(FontWeight::BOLD)
                    .text_color(rgb(0xa78bfa))
                    .child(story.title.clone()),
            )
            .child(
                div()
                    .text_xs()
                    .text_color(rgb(0x666666))
                    .child(match player.selected_voice().and_then(voice_by_value) {
                        Some(voice) => {
                            format!("{} words · read by {}", story.word_count(), voice.name)
                        }
                        None => format!("{} words", story.word_count()),
                    }),
            )
            .child(
                div()
                    .id("story-text")
                    .max_h(px(280.0))
                    .overflow_y_scroll()
                    .p_4()
                    .rounded_lg()
                    .bg(rgb(0x1a1a2e))
                    .text_color(rgb(0xdddddd))
                    .child(story.text.clone()),
            )
            .child(
                div()
                    .flex()
                    .items_center()
                    .justify_center()
                    .gap_4()
                    .when(player.has_audio(), |el| {
                        el.child(
                            div()
                                .id("toggle-playback")
                                .flex()
                                .items_center()
                                .justify_center()
                                .size(px(64.0))
                                .rounded_full()
                                .bg(rgb(0xe94560))
                                .cursor_pointer()
                                .hover(|style| style.bg(rgb(0xd63d56)))
                                .on_click(cx.listener(|this, _, _window, cx| {
                                    this.with_player(cx, |player| {
                                        player.toggle_playback();
                                    })
                                }))
                                .child(icon(
                                    if is_playing { Icon::Pause } else { Icon::Play },
                                    28.0,
                                    0xffffff,
                                )),
                        )
                    })
                    .when(player.is_generating(), |el| {
                        el.child(
                            div()
                                .text_sm()
                                .text_color(rgb(0x888888))
                                .child("Generating narration..."),
                        )
                    }),
            )
            .when(is_playing, |el| el.child(progress_bar(player.progress())))
            .when_some(player.error(), |el, message| {
                el.child(
                    div()
                        .flex()
                        .justify_center()
                        .text_sm()
                        .text_color(rgb(0xef4444))
                        .child(message),
                )
            })
            .child(
                panel_header(
                    "panel-synthesized",
                    "Listen with an AI Voice",
                    Icon::Speaker,
                    0x7c3aed,
                )
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.with_player(cx, |player| player.toggle_synthesized_panel())
                })),
            )
            .when(panel == NarrationPanel::SynthesizedVoice, |el| {
                el.child(self.render_voice_list(cx))
            })
            .child(
                panel_header(
                    "panel-recorded",
                    "Record Your Own Voice",
                    Icon::Microphone,
                    0x2563eb,
                )
                .on_click(cx.listener(|this, _, _window, cx| {
                    this.with_player(cx, |player| player.toggle_recorded_panel())
                })),
            )
            .when(panel == NarrationPanel::RecordedVoice, |el| {
                el.child(self.render_recorder(cx))
            })
    }

    fn render_voice_list(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let selected = self.player.as_ref().and_then(|p| p.selected_voice());

        div()
            .flex()
            .flex_wrap()
            .gap_2()
            .p_4()
            .rounded_lg()
            .bg(rgb(0x1a1a2e))
            .children(VOICE_OPTIONS.iter().map(|voice| {
                let value = voice.value;
                let is_selected = selected == Some(value);
                div()
                    .id(SharedString::from(format!("voice-{}", value)))
                    .px_4()
                    .py_2()
                    .rounded_md()
                    .text_sm()
                    .cursor_pointer()
                    .bg(rgb(if is_selected { 0x7c3aed } else { 0x2d2d44 }))
                    .text_color(rgb(0xffffff))
                    .hover(|style| style.bg(rgb(0x6d28d9)))
                    .on_click(cx.listener(move |this, _, _window, cx| {
                        this.select_voice(value, cx)
                    }))
                    .child(voice.name)
            }))
    }

    fn render_recorder(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let Some(player) = self.player.as_ref() else {
            return div();
        };
        let is_recording = player.is_recording();
        let level = player.recording_level();
        let seconds = player.recording_seconds() as u64;

        div()
            .flex()
            .flex_col()
            .items_center()
            .gap_3()
            .p_4()
            .rounded_lg()
            .bg(rgb(0x1a1a2e))
            .child(
                div()
                    .id(if is_recording {
                        "stop-recording"
                    } else {
                        "start-recording"
                    })
                    .flex()
                    .items_center()
                    .justify_center()
                    .size(px(80.0))
                    .rounded_full()
                    .cursor_pointer()
                    .bg(rgb(if is_recording { 0x374151 } else { 0xef4444 }))
                    .on_click(cx.listener(move |this, _, _window, cx| {
                        this.with_player(cx, |player| {
                            if is_recording {
                                player.stop_recording();
                            } else {
                                player.start_recording();
                            }
                        })
                    }))
                    .child(icon(
                        if is_recording { Icon::Stop } else { Icon::Record },
                        36.0,
                        0xffffff,
                    )),
            )
            .when(is_recording, |el| {
                el.child(progress_bar((level * 4.0).min(1.0))).child(
                    div()
                        .text_sm()
                        .text_color(rgb(0xcccccc))
                        .child(format!("{:02}:{:02}", seconds / 60, seconds % 60)),
                )
            })
            .child(
                div()
                    .text_sm()
                    .text_color(rgb(0x888888))
                    .child(if is_recording {
                        "Recording your magical voice..."
                    } else {
                        "Tap the button to start recording"
                    }),
            )
            .when_some(player.capture_error(), |el, message| {
                el.child(div().text_xs().text_color(rgb(0xef4444)).child(message))
            })
    }
}

fn render_loading(idea: &StoryIdea) -> impl IntoElement {
    div()
        .flex()
        .flex_col()
        .items_center()
        .justify_center()
        .gap_4()
        .p_8()
        .mt_16()
        .child(icon(Icon::BookOpen, 48.0, 0xa78bfa))
        .child(
            div()
                .text_2xl()
                .font_weight(FontWeight::BOLD)
                .text_color(rgb(0xffffff))
                .child("Your Story is Brewing..."),
        )
        .child(
            div()
                .text_color(rgb(0x888888))
                .child("The story fairies are mixing words and magic!"),
        )
        .child(
            div()
                .text_sm()
                .text_color(rgb(0x666666))
                .child(idea.title.clone()),
        )
}

fn icon(icon: Icon, size: f32, color: u32) -> impl IntoElement {
    svg()
        .path(icon.path())
        .size(px(size))
        .flex_none()
        .text_color(rgb(color))
}

fn back_button(cx: &mut Context<StoryNest>) -> impl IntoElement {
    div()
        .id("back")
        .flex()
        .items_center()
        .gap_2()
        .cursor_pointer()
        .text_color(rgb(0x888888))
        .hover(|style| style.text_color(rgb(0xffffff)))
        .on_click(cx.listener(|this, _, _window, cx| this.back(cx)))
        .child(icon(Icon::ChevronLeft, 20.0, 0x888888))
        .child("Back")
}

fn form_field(label: &'static str, state: &Entity<InputState>) -> impl IntoElement {
    div()
        .flex()
        .flex_col()
        .gap_1()
        .child(
            div()
                .text_sm()
                .font_weight(FontWeight::SEMIBOLD)
                .text_color(rgb(0xcccccc))
                .child(label),
        )
        .child(Input::new(state))
}

fn idea_card(index: usize, idea: &StoryIdea) -> Stateful<Div> {
    div()
        .id(SharedString::from(format!("idea-{}", index)))
        .flex()
        .flex_col()
        .gap_2()
        .w(px(280.0))
        .p_4()
        .rounded_lg()
        .bg(rgb(0x1a1a2e))
        .border_1()
        .border_color(rgb(0x2d2d44))
        .cursor_pointer()
        .hover(|style| style.border_color(rgb(0xe94560)))
        .child(
            div()
                .font_weight(FontWeight::BOLD)
                .text_color(rgb(0xa78bfa))
                .child(idea.title.clone()),
        )
        .child(
            div()
                .text_sm()
                .text_color(rgb(0xaaaaaa))
                .child(idea.premise.clone()),
        )
}

fn skeleton_card() -> impl IntoElement {
    div()
        .flex()
        .flex_col()
        .gap_2()
        .w(px(280.0))
        .p_4()
        .rounded_lg()
        .bg(rgb(0x1a1a2e))
        .child(div().h(px(18.0)).w(px(180.0)).rounded_md().bg(rgb(0x2d2d44)))
        .child(div().h(px(12.0)).w_full().rounded_md().bg(rgb(0x2d2d44)))
        .child(div().h(px(12.0)).w(px(200.0)).rounded_md().bg(rgb(0x2d2d44)))
}

fn panel_header(id: &'static str, label: &'static str, glyph: Icon, color: u32) -> Stateful<Div> {
    div()
        .id(id)
        .flex()
        .items_center()
        .justify_between()
        .w_full()
        .p_3()
        .rounded_lg()
        .bg(rgb(color))
        .cursor_pointer()
        .child(
            div()
                .font_weight(FontWeight::BOLD)
                .text_color(rgb(0xffffff))
                .child(label),
        )
        .child(icon(glyph, 20.0, 0xffffff))
}

fn progress_bar(fraction: f32) -> impl IntoElement {
    div()
        .w_full()
        .h(px(6.0))
        .rounded_full()
        .bg(rgb(0x2d2d44))
        .child(
            div()
                .h_full()
                .w(relative(fraction.clamp(0.0, 1.0)))
                .rounded_full()
                .bg(rgb(0xe94560)),
        )
}
