//! Course invitations and study groups.
//!
//! Sending an invitation also drops a `CourseInvite` message into the
//! recipient's direct chat so it shows up inline; accepting one spins up a
//! study group and announces it the same way.

use tracing::info;
use uuid::Uuid;

use cohort_shared::{ChatTarget, CourseId, InviteStatus, UserId};
use cohort_store::{Course, CourseInvitation, Message, MessageBody, StudyGroup};

use crate::error::Result;
use crate::events::{emit, ClientEvent};
use crate::messenger::Messenger;
use crate::state::lock;

impl Messenger {
    /// Courses owned by the signed-in user, for the invitation picker.
    pub fn my_courses(&self) -> Result<Vec<Course>> {
        let guard = lock(&self.state)?;
        Ok(guard.db.courses_for_user(&guard.user.id)?)
    }

    /// Invite another user to study a course together.
    ///
    /// Persists a pending invitation, then posts a `CourseInvite` message to
    /// the recipient's direct chat.
    pub fn send_course_invitation(
        &mut self,
        course_id: CourseId,
        course_name: &str,
        to: UserId,
    ) -> Result<CourseInvitation> {
        let me = self.me()?;
        let invitation = CourseInvitation::new(
            course_id.clone(),
            course_name,
            me.id.clone(),
            me.name.clone(),
            to.clone(),
        );
        lock(&self.state)?.db.insert_invitation(&invitation)?;

        let message = Message::new(
            me.id,
            me.name,
            ChatTarget::Direct(to),
            MessageBody::CourseInvite {
                course_id,
                course_name: course_name.to_string(),
                invitation_id: invitation.id,
            },
        );
        self.append_message(message)?;

        info!(invitation = %invitation.id, course = %invitation.course_id, "invitation sent");
        Ok(invitation)
    }

    /// Accept an invitation.  Only the status changes; forming a study
    /// group stays a separate, explicit [`create_study_group`] call.
    ///
    /// [`create_study_group`]: Messenger::create_study_group
    pub fn accept_course_invitation(&mut self, id: Uuid) -> Result<CourseInvitation> {
        self.set_invitation_status(id, InviteStatus::Accepted)
    }

    /// Decline an invitation.  Terminal like accept.
    pub fn decline_course_invitation(&mut self, id: Uuid) -> Result<CourseInvitation> {
        self.set_invitation_status(id, InviteStatus::Declined)
    }

    fn set_invitation_status(
        &mut self,
        id: Uuid,
        status: InviteStatus,
    ) -> Result<CourseInvitation> {
        let invitation = lock(&self.state)?.db.set_invitation_status(id, status)?;
        emit(
            &self.events,
            ClientEvent::InvitationUpdated {
                id,
                status: invitation.status,
            },
        );
        Ok(invitation)
    }

    /// All invitations involving the signed-in user, newest first.
    pub fn invitations(&self) -> Result<Vec<CourseInvitation>> {
        let guard = lock(&self.state)?;
        Ok(guard.db.invitations_for_user(&guard.user.id)?)
    }

    /// Invitations still awaiting a response from the signed-in user.
    pub fn pending_invitations(&self) -> Result<Vec<CourseInvitation>> {
        let guard = lock(&self.state)?;
        let me = guard.user.id.clone();
        Ok(guard
            .db
            .invitations_for_user(&me)?
            .into_iter()
            .filter(|i| i.to == me && i.status == InviteStatus::Pending)
            .collect())
    }

    /// Create a study group for a course and announce it to each invited
    /// member's direct chat.
    pub fn create_study_group(
        &mut self,
        course_id: CourseId,
        course_name: &str,
        members: Vec<UserId>,
    ) -> Result<StudyGroup> {
        let me = self.me()?;
        let group = StudyGroup::new(course_id, course_name, me.id.clone(), members);
        lock(&self.state)?.db.insert_study_group(&group)?;

        for member in group.members.iter().filter(|m| **m != me.id) {
            let message = Message::new(
                me.id.clone(),
                me.name.clone(),
                ChatTarget::Direct(member.clone()),
                MessageBody::StudyGroup {
                    group_id: group.id,
                    name: group.name.clone(),
                },
            );
            self.append_message(message)?;
        }

        info!(group = %group.id, name = %group.name, "study group created");
        Ok(group)
    }

    /// Study groups the signed-in user belongs to.
    pub fn study_groups(&self) -> Result<Vec<StudyGroup>> {
        let guard = lock(&self.state)?;
        Ok(guard.db.study_groups_for_member(&guard.user.id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::tests::{alice, bob, messenger_for};

    fn invite(m: &mut Messenger) -> CourseInvitation {
        m.send_course_invitation(CourseId::new("math-101"), "Calculus I", UserId::new("bob"))
            .unwrap()
    }

    #[test]
    fn send_invitation_posts_inline_message() {
        let mut m = messenger_for(alice());
        let invitation = invite(&mut m);
        assert_eq!(invitation.status, InviteStatus::Pending);

        m.select_chat(ChatTarget::Direct(UserId::new("bob"))).unwrap();
        assert_eq!(m.messages().len(), 1);
        match &m.messages()[0].body {
            MessageBody::CourseInvite { invitation_id, course_name, .. } => {
                assert_eq!(*invitation_id, invitation.id);
                assert_eq!(course_name, "Calculus I");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn accept_flips_status_and_nothing_else() {
        // Alice invites Bob; Bob accepts from his own session.
        let mut alice_m = messenger_for(alice());
        let invitation = invite(&mut alice_m);

        let mut bob_m = messenger_for(bob());
        {
            let guard = crate::state::lock(&bob_m.state).unwrap();
            guard.db.upsert_user(&alice()).unwrap();
            guard.db.insert_invitation(&invitation).unwrap();
        }

        let accepted = bob_m.accept_course_invitation(invitation.id).unwrap();
        assert_eq!(accepted.status, InviteStatus::Accepted);

        // No group appears and no message is sent until Bob forms one.
        assert!(bob_m.study_groups().unwrap().is_empty());
        bob_m
            .select_chat(ChatTarget::Direct(UserId::new("alice")))
            .unwrap();
        assert!(bob_m.messages().is_empty());

        // Re-accepting is idempotent.
        let again = bob_m.accept_course_invitation(invitation.id).unwrap();
        assert_eq!(again.revision, accepted.revision);
    }

    #[test]
    fn study_group_creation_is_explicit_and_announced() {
        let mut bob_m = messenger_for(bob());
        crate::state::lock(&bob_m.state)
            .unwrap()
            .db
            .upsert_user(&alice())
            .unwrap();

        let group = bob_m
            .create_study_group(
                CourseId::new("math-101"),
                "Calculus I",
                vec![UserId::new("alice")],
            )
            .unwrap();
        assert_eq!(group.name, "Calculus I Study Group");
        assert_eq!(group.members, vec![UserId::new("bob"), UserId::new("alice")]);
        assert_eq!(bob_m.study_groups().unwrap().len(), 1);

        // The announcement lands in Alice's direct chat.
        bob_m
            .select_chat(ChatTarget::Direct(UserId::new("alice")))
            .unwrap();
        assert!(matches!(
            bob_m.messages().last().unwrap().body,
            MessageBody::StudyGroup { .. }
        ));
    }

    #[test]
    fn decline_is_terminal_and_creates_nothing() {
        let mut m = messenger_for(alice());
        let invitation = invite(&mut m);

        let declined = m.decline_course_invitation(invitation.id).unwrap();
        assert_eq!(declined.status, InviteStatus::Declined);
        assert!(m.study_groups().unwrap().is_empty());

        // Re-declining changes nothing.
        let again = m.decline_course_invitation(invitation.id).unwrap();
        assert_eq!(again.revision, declined.revision);
    }

    #[test]
    fn pending_invitations_only_count_incoming() {
        let mut alice_m = messenger_for(alice());
        let invitation = invite(&mut alice_m);

        // Outgoing invitation is listed but not pending for the sender.
        assert_eq!(alice_m.invitations().unwrap().len(), 1);
        assert!(alice_m.pending_invitations().unwrap().is_empty());

        let bob_m = messenger_for(bob());
        crate::state::lock(&bob_m.state)
            .unwrap()
            .db
            .insert_invitation(&invitation)
            .unwrap();
        assert_eq!(bob_m.pending_invitations().unwrap().len(), 1);
    }

    #[test]
    fn my_courses_reads_owned_courses() {
        let m = messenger_for(alice());
        {
            let guard = crate::state::lock(&m.state).unwrap();
            guard
                .db
                .upsert_course(&Course {
                    id: CourseId::new("bio-200"),
                    title: "Genetics".to_string(),
                    owner: UserId::new("alice"),
                })
                .unwrap();
            guard
                .db
                .upsert_course(&Course {
                    id: CourseId::new("cs-101"),
                    title: "Intro CS".to_string(),
                    owner: UserId::new("bob"),
                })
                .unwrap();
        }
        let courses = m.my_courses().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Genetics");
    }
}
